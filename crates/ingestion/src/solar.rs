//! Solar irradiance sampling over a lat/lon grid.

use async_trait::async_trait;
use map_common::{LatLon, SamplePoint};
use metrics::counter;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use storage::PointCache;
use tracing::{debug, info, instrument, warn};

use crate::config::{http_client, PowerConfig};
use crate::error::{FetchError, IngestionError, Result};

/// POWER marks missing periods with this value.
const FILL_VALUE: f64 = -999.0;

/// Emit a progress log line every this many grid positions.
const PROGRESS_EVERY: usize = 10;

/// A per-point climatology lookup.
#[async_trait]
pub trait ClimatologySource: Send + Sync {
    /// Mean irradiance at `point`, or why there is none.
    async fn fetch_point(&self, point: LatLon) -> std::result::Result<f64, FetchError>;
}

/// NASA POWER climatology client.
pub struct PowerClient {
    client: Client,
    config: PowerConfig,
}

impl PowerClient {
    pub fn new(config: PowerConfig) -> Result<Self> {
        let client = http_client(config.timeout)?;
        Ok(Self { client, config })
    }

    pub fn point_url(&self, point: LatLon) -> String {
        format!(
            "{}?parameters={}&community={}&longitude={}&latitude={}&format=JSON",
            self.config.base_url, self.config.parameter, self.config.community, point.lon, point.lat
        )
    }
}

#[async_trait]
impl ClimatologySource for PowerClient {
    #[instrument(skip(self), fields(lat = point.lat, lon = point.lon))]
    async fn fetch_point(&self, point: LatLon) -> std::result::Result<f64, FetchError> {
        let url = self.point_url(point);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| FetchError::from_reqwest(&url, e))?;

        mean_parameter_value(&body, &self.config.parameter)
            .ok_or_else(|| FetchError::malformed(&url, format!("no usable {} values", self.config.parameter)))
    }
}

/// Mean of every periodic value under `properties.parameter.<name>`.
///
/// Fill values and non-finite entries are ignored; `None` when nothing is left.
pub fn mean_parameter_value(body: &Value, parameter: &str) -> Option<f64> {
    let series = body
        .get("properties")?
        .get("parameter")?
        .get(parameter)?
        .as_object()?;

    let values: Vec<f64> = series
        .values()
        .filter_map(Value::as_f64)
        .filter(|v| v.is_finite() && *v != FILL_VALUE)
        .collect();

    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Progress of a sampling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleProgress {
    /// 1-based position in the grid of the point just handled
    pub position: usize,
    pub total: usize,
    pub sampled: usize,
    pub failed: usize,
}

impl SampleProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.position as f64 / self.total as f64
        }
    }
}

/// Result of [`SolarSampler::sample`].
#[derive(Debug, Clone, Default)]
pub struct SampleOutcome {
    pub points: Vec<SamplePoint>,
    pub from_cache: bool,
    /// Requests issued (zero when served from cache)
    pub attempted: usize,
    pub failed: usize,
}

/// Samples the climatology source over a grid, backed by the point cache.
#[derive(Clone)]
pub struct SolarSampler {
    source: Arc<dyn ClimatologySource>,
    cache: PointCache,
}

impl SolarSampler {
    pub fn new(source: Arc<dyn ClimatologySource>, cache: PointCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &PointCache {
        &self.cache
    }

    /// Sample every `skip_factor`-th grid point (1-based positions divisible
    /// by the factor), one request at a time.
    ///
    /// A present, non-empty point cache is returned as-is without touching
    /// the network, whatever the grid. Otherwise the full pass is written to
    /// the cache afterwards; a failed write is logged, not returned.
    pub async fn sample(
        &self,
        grid: &[LatLon],
        skip_factor: usize,
        progress: Option<&(dyn Fn(SampleProgress) + Send + Sync)>,
    ) -> Result<SampleOutcome> {
        if skip_factor == 0 {
            return Err(IngestionError::InvalidConfig(
                "skip factor must be at least 1".to_string(),
            ));
        }

        if let Some(points) = self.cache.load() {
            return Ok(SampleOutcome {
                points,
                from_cache: true,
                ..Default::default()
            });
        }

        let total = grid.len();
        info!(total, skip_factor, "Sampling solar irradiance");

        let mut outcome = SampleOutcome::default();
        for (i, point) in grid.iter().enumerate() {
            let position = i + 1;
            if position % skip_factor != 0 {
                continue;
            }

            outcome.attempted += 1;
            match self.source.fetch_point(*point).await {
                Ok(value) => outcome.points.push(SamplePoint::new(point.lat, point.lon, value)),
                Err(e) => {
                    outcome.failed += 1;
                    counter!("terra_fetch_failures_total", "source" => "power", "kind" => e.kind())
                        .increment(1);
                    debug!(lat = point.lat, lon = point.lon, error = %e, "Dropping point");
                }
            }

            let report = SampleProgress {
                position,
                total,
                sampled: outcome.points.len(),
                failed: outcome.failed,
            };
            if let Some(callback) = progress {
                callback(report);
            }
            if position % PROGRESS_EVERY == 0 {
                info!(position, total, failed = outcome.failed, "Fetching solar data");
            }
        }

        if let Err(e) = self.cache.store(&outcome.points) {
            warn!(error = %e, "Failed to write solar point cache");
        }

        info!(
            sampled = outcome.points.len(),
            failed = outcome.failed,
            "Solar sampling complete"
        );
        Ok(outcome)
    }
}
