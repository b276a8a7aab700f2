//! Per-country CO₂ emissions.

use async_trait::async_trait;
use map_common::{LatLon, SamplePoint};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use storage::centroid_cache::CentroidMap;
use tracing::{debug, info, instrument};

use crate::config::{http_client, EmissionsConfig};
use crate::error::{FetchError, IngestionError, Result};

/// One row of the emissions table: a dataset country name and its total (Mt CO₂).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRow {
    pub country: String,
    pub co2_total_mt: f64,
}

/// Provider of per-country emission totals.
#[async_trait]
pub trait EmissionsSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<EmissionRow>>;

    /// Human-readable origin, for logs and status messages.
    fn describe(&self) -> String;
}

/// Pick the local file when configured, the World Bank API otherwise.
pub fn from_config(config: &EmissionsConfig) -> Result<Box<dyn EmissionsSource>> {
    Ok(match &config.local_path {
        Some(path) => Box::new(LocalEmissionsFile::new(path.clone())),
        None => Box::new(WorldBankClient::new(config.clone())?),
    })
}

/// World Bank v2 indicator API.
pub struct WorldBankClient {
    client: Client,
    config: EmissionsConfig,
}

impl WorldBankClient {
    pub fn new(config: EmissionsConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self { client, config })
    }

    pub fn url(&self) -> String {
        format!(
            "{}/country/all/indicator/{}?format=json&date={}&per_page=20000",
            self.config.base_url.trim_end_matches('/'),
            self.config.indicator,
            self.config.year
        )
    }
}

#[async_trait]
impl EmissionsSource for WorldBankClient {
    #[instrument(skip(self), fields(indicator = %self.config.indicator, year = self.config.year))]
    async fn fetch(&self) -> Result<Vec<EmissionRow>> {
        let url = self.url();
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&url, e))?
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let rows = parse_world_bank(&body).map_err(|message| FetchError::malformed(&url, message))?;
        info!(rows = rows.len(), "Fetched World Bank emissions");
        Ok(rows)
    }

    fn describe(&self) -> String {
        format!("World Bank {} ({})", self.config.indicator, self.config.year)
    }
}

/// Extract `(country name, value)` rows from a `[meta, rows]` response.
///
/// Rows with a null value are dropped. An error payload (`[{"message": …}]`)
/// or any other shape is rejected.
pub fn parse_world_bank(body: &Value) -> std::result::Result<Vec<EmissionRow>, String> {
    let parts = body.as_array().ok_or("response is not an array")?;

    if let Some(message) = parts.first().and_then(|m| m.get("message")) {
        return Err(format!("API error: {}", message));
    }

    let rows = match parts.get(1) {
        Some(Value::Array(rows)) => rows,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(_) => return Err("rows are not an array".to_string()),
    };

    let parsed = rows
        .iter()
        .filter_map(|row| {
            let country = row.get("country")?.get("value")?.as_str()?.trim();
            let value = row.get("value")?.as_f64()?;
            Some(EmissionRow {
                country: country.to_string(),
                co2_total_mt: value,
            })
        })
        .collect();
    Ok(parsed)
}

/// JSON file holding `[{"country": …, "co2_total_mt": …}, …]`.
///
/// Entries with a missing or null total are skipped.
pub struct LocalEmissionsFile {
    path: PathBuf,
}

#[derive(Deserialize)]
struct LocalRow {
    country: String,
    #[serde(default)]
    co2_total_mt: Option<f64>,
}

impl LocalEmissionsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EmissionsSource for LocalEmissionsFile {
    async fn fetch(&self) -> Result<Vec<EmissionRow>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| IngestionError::FileRead {
                path: self.path.clone(),
                source,
            })?;

        let rows: Vec<LocalRow> = serde_json::from_str(&text).map_err(|e| IngestionError::Parse {
            what: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|r| {
                r.co2_total_mt.map(|v| EmissionRow {
                    country: r.country.trim().to_string(),
                    co2_total_mt: v,
                })
            })
            .collect())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// A dataset row after name resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    pub raw_name: String,
    pub canonical_name: Option<String>,
    pub centroid: Option<LatLon>,
    pub raw_value: f64,
}

impl CountryRecord {
    /// Resolve every row against the centroid map. Unresolved rows are kept
    /// with `canonical_name == None`.
    pub fn resolve_all(rows: Vec<EmissionRow>, centroids: &CentroidMap) -> Vec<CountryRecord> {
        rows.into_iter()
            .map(|row| {
                let canonical = geodata::resolve(&row.country, centroids).map(str::to_string);
                if canonical.is_none() {
                    debug!(country = %row.country, "Unresolved country name");
                }
                let centroid = canonical.as_deref().and_then(|name| centroids.get(name).copied());
                CountryRecord {
                    raw_name: row.country,
                    canonical_name: canonical,
                    centroid,
                    raw_value: row.co2_total_mt,
                }
            })
            .collect()
    }

    /// Placed samples for resolved records, one per country. When several
    /// dataset names resolve to the same country the first row wins.
    pub fn to_samples(records: &[CountryRecord]) -> Vec<SamplePoint> {
        let mut placed: HashSet<&str> = HashSet::new();
        records
            .iter()
            .filter_map(|r| {
                let name = r.canonical_name.as_deref()?;
                let centroid = r.centroid?;
                if !placed.insert(name) {
                    debug!(country = %r.raw_name, canonical = name, "Duplicate country row skipped");
                    return None;
                }
                Some(SamplePoint::new(centroid.lat, centroid.lon, r.raw_value))
            })
            .collect()
    }
}
