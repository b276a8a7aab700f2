//! Source endpoints and request settings.

use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{IngestionError, Result};

/// NASA POWER climatology point endpoint.
pub const DEFAULT_POWER_URL: &str = "https://power.larc.nasa.gov/api/temporal/climatology/point";

/// All-sky surface shortwave downward irradiance (kWh/m²/day).
pub const DEFAULT_POWER_PARAMETER: &str = "ALLSKY_SFC_SW_DWN";

/// Natural Earth admin-0 polygons.
pub const DEFAULT_GEOMETRY_URL: &str =
    "https://raw.githubusercontent.com/datasets/geo-countries/master/data/countries.geojson";

pub const DEFAULT_WORLD_BANK_URL: &str = "https://api.worldbank.org/v2";

/// Total CO₂ emissions excluding LULUCF (Mt CO₂e).
pub const DEFAULT_CO2_INDICATOR: &str = "EN.GHG.CO2.MT.CE.AR5";

pub const DEFAULT_CO2_YEAR: u16 = 2023;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the irradiance source.
#[derive(Debug, Clone)]
pub struct PowerConfig {
    pub base_url: String,
    pub parameter: String,
    pub community: String,
    pub timeout: Duration,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_POWER_URL.to_string(),
            parameter: DEFAULT_POWER_PARAMETER.to_string(),
            community: "RE".to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Where country polygons come from. A local path takes precedence.
#[derive(Debug, Clone)]
pub struct GeometryConfig {
    pub url: String,
    pub local_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GEOMETRY_URL.to_string(),
            local_path: None,
            // The full geometry document is tens of megabytes
            timeout: Duration::from_secs(120),
        }
    }
}

/// Where per-country emissions come from. A local path takes precedence.
#[derive(Debug, Clone)]
pub struct EmissionsConfig {
    pub base_url: String,
    pub indicator: String,
    pub year: u16,
    pub local_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WORLD_BANK_URL.to_string(),
            indicator: DEFAULT_CO2_INDICATOR.to_string(),
            year: DEFAULT_CO2_YEAR,
            local_path: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// HTTP client with a fixed per-request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .user_agent(concat!("terra-map/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| IngestionError::Client(e.to_string()))
}
