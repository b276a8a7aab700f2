//! Service configuration.
//!
//! Everything is read from environment variables (a `.env` file is loaded
//! first by the binary) with built-in defaults; command-line flags override
//! individual fields afterwards.

use anyhow::{bail, Context, Result};
use ingestion::config::{
    DEFAULT_CO2_INDICATOR, DEFAULT_CO2_YEAR, DEFAULT_GEOMETRY_URL, DEFAULT_POWER_PARAMETER,
    DEFAULT_POWER_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_WORLD_BANK_URL,
};
use ingestion::{EmissionsConfig, GeometryConfig, PowerConfig};
use map_common::StyleConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Grid resolution and sampling density for the solar layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub lat_step: f64,
    pub lon_step: f64,
    /// Sample every N-th grid point
    pub skip_factor: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            lat_step: 20.0,
            lon_step: 20.0,
            skip_factor: 1,
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub listen: String,
    /// Directory holding the point and centroid cache files
    pub cache_dir: PathBuf,
    pub sampling: SamplingConfig,
    pub power: PowerConfig,
    pub geometry: GeometryConfig,
    pub emissions: EmissionsConfig,
    /// Optional JSON style file overriding the built-in overlay styles
    pub style_path: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_string(),
            cache_dir: PathBuf::from("./cache"),
            sampling: SamplingConfig::default(),
            power: PowerConfig::default(),
            geometry: GeometryConfig::default(),
            emissions: EmissionsConfig::default(),
            style_path: None,
        }
    }
}

impl MapConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let timeout = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(v) => Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", &v)?),
            Err(_) => DEFAULT_REQUEST_TIMEOUT,
        };

        let power = PowerConfig {
            base_url: env::var("POWER_URL").unwrap_or_else(|_| DEFAULT_POWER_URL.to_string()),
            parameter: env::var("POWER_PARAMETER")
                .unwrap_or_else(|_| DEFAULT_POWER_PARAMETER.to_string()),
            community: env::var("POWER_COMMUNITY").unwrap_or_else(|_| "RE".to_string()),
            timeout,
        };

        let geometry = GeometryConfig {
            url: env::var("GEOMETRY_URL").unwrap_or_else(|_| DEFAULT_GEOMETRY_URL.to_string()),
            local_path: env::var("GEOMETRY_PATH").ok().map(PathBuf::from),
            ..GeometryConfig::default()
        };

        let emissions = EmissionsConfig {
            base_url: env::var("WORLD_BANK_URL")
                .unwrap_or_else(|_| DEFAULT_WORLD_BANK_URL.to_string()),
            indicator: env::var("CO2_INDICATOR")
                .unwrap_or_else(|_| DEFAULT_CO2_INDICATOR.to_string()),
            year: optional_var("CO2_YEAR")?.unwrap_or(DEFAULT_CO2_YEAR),
            local_path: env::var("EMISSIONS_PATH").ok().map(PathBuf::from),
            timeout,
        };

        let defaults = SamplingConfig::default();
        let sampling = SamplingConfig {
            lat_step: optional_var("LAT_STEP")?.unwrap_or(defaults.lat_step),
            lon_step: optional_var("LON_STEP")?.unwrap_or(defaults.lon_step),
            skip_factor: optional_var("SKIP_FACTOR")?.unwrap_or(defaults.skip_factor),
        };

        let config = Self {
            listen: env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            cache_dir: env::var("TERRA_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./cache")),
            sampling,
            power,
            geometry,
            emissions,
            style_path: env::var("STYLE_FILE").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every render fail.
    pub fn validate(&self) -> Result<()> {
        let SamplingConfig {
            lat_step,
            lon_step,
            skip_factor,
        } = self.sampling;

        if !(lat_step.is_finite() && lat_step > 0.0) || !(lon_step.is_finite() && lon_step > 0.0) {
            bail!(
                "grid steps must be positive, got lat_step={} lon_step={}",
                lat_step,
                lon_step
            );
        }
        if skip_factor == 0 {
            bail!("skip factor must be at least 1");
        }
        Ok(())
    }

    /// Overlay styles: the configured file, or the built-in defaults.
    pub fn load_styles(&self) -> Result<StyleConfig> {
        let Some(path) = &self.style_path else {
            return Ok(StyleConfig::default());
        };

        let styles = StyleConfig::from_file(path)
            .with_context(|| format!("Failed to load styles from {}", path.display()))?;
        styles.validate().context("Invalid style configuration")?;
        info!(path = %path.display(), styles = styles.styles.len(), "Loaded overlay styles");
        Ok(styles)
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: {:?}", name, value))
}

fn optional_var<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(v) => parse_var(name, &v).map(Some),
        Err(_) => Ok(None),
    }
}
