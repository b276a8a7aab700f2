//! Render passes.
//!
//! A [`RenderEngine`] owns the data sources and caches and turns a
//! [`RenderRequest`] into overlays:
//!
//! ```text
//! solar:     grid ─► sampler (point cache) ─► land mask? ─► min-max
//! co2:       emissions ─► resolver + centroids ─► min-max (positive only)
//! pipelines: static table ─► log-ratio
//!                                  │
//!                                  ▼
//!                    composite::blend(weights) ─► overlays + status
//! ```
//!
//! Network calls are awaited one at a time. Nothing inside a pass is fatal:
//! a source that fails or a layer that cannot be normalized is reported as a
//! warning and left out.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use geodata::{parse_countries, select_land_mask, CentroidStore, CountryShape, GeoError};
use grid_processor::{blend, Degenerate, GridGenerator, LayerInput, NormalizedLayer, Normalizer};
use ingestion::{
    emissions, geometry, ClimatologySource, CountryRecord, EmissionsSource, GeometrySource,
    PowerClient, SampleProgress, SolarSampler,
};
use map_common::{
    LayerKind, LayerSelection, LayerWeights, MapError, MapResult, SamplePoint, StatusMessage,
    StyleConfig,
};
use metrics::{counter, histogram};
use renderer::{render_heatmap, Overlay, Raster};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use storage::centroid_cache::CentroidMap;
use storage::PointCache;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::{MapConfig, SamplingConfig};

/// Overlay id of the blended layer.
pub const COMPOSITE_ID: &str = "composite";

/// Progress callback for the solar sampling step.
pub type ProgressFn<'a> = &'a (dyn Fn(SampleProgress) + Send + Sync);

/// Remote (or local) datasets behind a render pass.
#[derive(Clone)]
pub struct Sources {
    pub climatology: Arc<dyn ClimatologySource>,
    pub emissions: Arc<dyn EmissionsSource>,
    pub geometry: Arc<dyn GeometrySource>,
}

impl Sources {
    /// Real clients, or local files where configured.
    pub fn from_config(config: &MapConfig) -> Result<Self> {
        let climatology =
            PowerClient::new(config.power.clone()).context("Failed to build POWER client")?;
        let emissions =
            emissions::from_config(&config.emissions).context("Failed to build emissions source")?;
        let geometry =
            geometry::from_config(&config.geometry).context("Failed to build geometry source")?;

        info!(
            emissions = %emissions.describe(),
            geometry = %geometry.describe(),
            "Data sources configured"
        );

        Ok(Self {
            climatology: Arc::new(climatology),
            emissions: Arc::from(emissions),
            geometry: Arc::from(geometry),
        })
    }
}

/// What to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub layers: LayerSelection,
    pub weights: LayerWeights,
    /// Drop solar samples that fall outside every country polygon
    pub land_only: bool,
    /// Blend the rendered layers into a composite overlay
    pub composite: bool,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            layers: LayerSelection::default(),
            weights: LayerWeights::default(),
            land_only: false,
            composite: true,
        }
    }
}

/// Blended overlay plus the weights that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeOverlay {
    #[serde(flatten)]
    pub overlay: Overlay,
    /// Effective weight per layer after rescaling to sum 1
    pub weights: BTreeMap<String, f64>,
}

/// Raw value range of a rendered layer, for legends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayerRange {
    pub layer: LayerKind,
    pub vmin: f64,
    pub vmax: f64,
}

/// Everything produced by one render pass.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub pass_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub overlays: Vec<Overlay>,
    pub ranges: Vec<LayerRange>,
    pub composite: Option<CompositeOverlay>,
    pub status: Vec<StatusMessage>,
}

impl RenderOutput {
    /// Overlay by id; `"composite"` selects the blended layer.
    pub fn overlay(&self, id: &str) -> Option<&Overlay> {
        if id == COMPOSITE_ID {
            return self.composite.as_ref().map(|c| &c.overlay);
        }
        self.overlays.iter().find(|o| o.id == id)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StatusMessage> {
        self.status.iter().filter(|s| s.is_warning())
    }
}

/// Per-pass scratch state.
struct Pass {
    status: Vec<StatusMessage>,
    shapes: Option<SharedShapes>,
}

type SharedShapes = Result<Arc<Vec<CountryShape>>, Arc<GeoError>>;

impl Pass {
    fn warn(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!(message = %text, "Render warning");
        self.status.push(StatusMessage::warning(text));
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status.push(StatusMessage::info(text));
    }
}

/// Orchestrates render passes over shared sources and caches.
pub struct RenderEngine {
    sources: Sources,
    sampler: SolarSampler,
    centroids: CentroidStore,
    grids: GridGenerator,
    sampling: SamplingConfig,
    styles: StyleConfig,
    /// Parsed country geometry, kept once loaded. Failed loads are retried
    /// on the next pass.
    countries: Mutex<Option<Arc<Vec<CountryShape>>>>,
}

impl RenderEngine {
    pub fn new(
        sources: Sources,
        cache_dir: impl AsRef<Path>,
        sampling: SamplingConfig,
        styles: StyleConfig,
    ) -> Self {
        let cache_dir = cache_dir.as_ref();
        Self {
            sampler: SolarSampler::new(
                sources.climatology.clone(),
                PointCache::in_dir(cache_dir),
            ),
            centroids: CentroidStore::in_dir(cache_dir),
            sources,
            grids: GridGenerator::new(),
            sampling,
            styles,
            countries: Mutex::new(None),
        }
    }

    pub fn from_config(config: &MapConfig) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.cache_dir).with_context(|| {
            format!("Failed to create cache directory {}", config.cache_dir.display())
        })?;

        Ok(Self::new(
            Sources::from_config(config)?,
            &config.cache_dir,
            config.sampling,
            config.load_styles()?,
        ))
    }

    pub fn styles(&self) -> &StyleConfig {
        &self.styles
    }

    pub fn sampling(&self) -> SamplingConfig {
        self.sampling
    }

    /// Delete the point and centroid caches. The next pass refetches.
    pub fn clear_caches(&self) -> MapResult<()> {
        use storage::Cache;

        self.sampler
            .cache()
            .clear()
            .map_err(|e| MapError::CacheError(e.to_string()))?;
        self.centroids
            .clear()
            .map_err(|e| MapError::CacheError(e.to_string()))?;
        info!("Cleared point and centroid caches");
        Ok(())
    }

    pub async fn render(&self, request: &RenderRequest) -> MapResult<RenderOutput> {
        self.render_with_progress(request, None).await
    }

    /// Run one render pass.
    ///
    /// Only invalid sampling settings fail the call; every data problem
    /// ends up in [`RenderOutput::status`].
    #[instrument(skip(self, progress), fields(layers = request.layers.len()))]
    pub async fn render_with_progress(
        &self,
        request: &RenderRequest,
        progress: Option<ProgressFn<'_>>,
    ) -> MapResult<RenderOutput> {
        let started = Instant::now();
        let pass_id = Uuid::new_v4();
        info!(%pass_id, land_only = request.land_only, "Starting render pass");

        let mut pass = Pass {
            status: Vec::new(),
            shapes: None,
        };

        if request.layers.is_empty() {
            pass.info("No layers selected");
        }

        let mut layers: Vec<(LayerKind, NormalizedLayer)> = Vec::new();
        for kind in request.layers.iter() {
            let layer = match kind {
                LayerKind::Solar => self.solar_layer(request, &mut pass, progress).await?,
                LayerKind::Co2 => self.co2_layer(&mut pass).await,
                LayerKind::Pipelines => self.pipelines_layer(&mut pass),
            };
            if let Some(layer) = layer {
                layers.push((kind, layer));
            }
        }

        let overlays = layers
            .iter()
            .map(|(kind, layer)| {
                Overlay::new(
                    kind.id(),
                    kind.title(),
                    layer.points.clone(),
                    &self.styles.for_layer(*kind),
                )
            })
            .collect();

        let ranges = layers
            .iter()
            .map(|(kind, layer)| LayerRange {
                layer: *kind,
                vmin: layer.vmin,
                vmax: layer.vmax,
            })
            .collect();

        let composite = if request.composite && !layers.is_empty() {
            self.composite(request, &layers, &mut pass)
        } else {
            None
        };

        counter!("terra_render_passes_total").increment(1);
        histogram!("terra_render_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            %pass_id,
            layers = layers.len(),
            warnings = pass.status.iter().filter(|s| s.is_warning()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Render pass complete"
        );

        Ok(RenderOutput {
            pass_id,
            generated_at: Utc::now(),
            overlays,
            ranges,
            composite,
            status: pass.status,
        })
    }

    /// Rasterize one overlay of a finished pass to PNG.
    pub fn render_png(
        &self,
        output: &RenderOutput,
        overlay_id: &str,
        width: u32,
        height: u32,
    ) -> MapResult<Vec<u8>> {
        let overlay = output.overlay(overlay_id).ok_or_else(|| {
            MapError::DataNotAvailable(format!("overlay '{}' was not rendered", overlay_id))
        })?;

        let style = if overlay_id == COMPOSITE_ID {
            self.styles.composite()
        } else {
            self.styles.for_layer(overlay_id.parse::<LayerKind>()?)
        };

        let raster = Raster::world(width, height)
            .map_err(|e| MapError::invalid("width/height", e.to_string()))?;
        let image = render_heatmap(&overlay.points, &style, &raster)
            .map_err(|e| MapError::RenderError(e.to_string()))?;
        image.to_png().map_err(|e| MapError::RenderError(e.to_string()))
    }

    async fn solar_layer(
        &self,
        request: &RenderRequest,
        pass: &mut Pass,
        progress: Option<ProgressFn<'_>>,
    ) -> MapResult<Option<NormalizedLayer>> {
        let SamplingConfig {
            lat_step,
            lon_step,
            skip_factor,
        } = self.sampling;

        let grid = self.grids.generate(lat_step, lon_step)?;
        let outcome = self
            .sampler
            .sample(&grid, skip_factor, progress)
            .await
            .map_err(|e| MapError::invalid("skip_factor", e.to_string()))?;

        if outcome.from_cache {
            pass.info(format!(
                "Solar: {} points loaded from cache",
                outcome.points.len()
            ));
        } else {
            pass.info(format!(
                "Solar: sampled {} of {} grid points",
                outcome.points.len(),
                grid.len()
            ));
            if outcome.failed > 0 {
                pass.warn(format!(
                    "Solar: {} of {} requests failed; those points are missing",
                    outcome.failed, outcome.attempted
                ));
            }
        }

        let mut samples = outcome.points;
        if request.land_only {
            let shapes = self.countries_for_pass(pass).await;
            let (mask, warning) = select_land_mask(
                shapes
                    .as_ref()
                    .map(|s| s.as_slice())
                    .map_err(|e| e.as_ref()),
            );
            if let Some(warning) = warning {
                pass.status.push(warning);
            }
            let before = samples.len();
            samples = mask.retain_land(samples);
            debug!(mask = mask.kind(), before, after = samples.len(), "Applied land mask");
        }

        Ok(normalize_or_warn(
            pass,
            LayerKind::Solar,
            &samples,
            Normalizer::min_max(),
        ))
    }

    async fn co2_layer(&self, pass: &mut Pass) -> Option<NormalizedLayer> {
        let rows = match self.sources.emissions.fetch().await {
            Ok(rows) => rows,
            Err(e) => {
                pass.warn(format!(
                    "CO₂: emissions unavailable from {} ({})",
                    self.sources.emissions.describe(),
                    e
                ));
                return None;
            }
        };

        let centroids = match self.centroid_map(pass).await {
            Ok(map) => map,
            Err(e) => {
                pass.warn(format!("CO₂: country centroids unavailable ({})", e));
                return None;
            }
        };

        let total = rows.len();
        let records = CountryRecord::resolve_all(rows, &centroids);
        let samples: Vec<SamplePoint> = CountryRecord::to_samples(&records);
        pass.info(format!("CO₂: placed {} of {} countries", samples.len(), total));

        normalize_or_warn(pass, LayerKind::Co2, &samples, Normalizer::positive_min_max())
    }

    fn pipelines_layer(&self, pass: &mut Pass) -> Option<NormalizedLayer> {
        let samples = ingestion::pipeline_samples();
        pass.info(format!("Pipelines: {} countries", samples.len()));
        normalize_or_warn(pass, LayerKind::Pipelines, &samples, Normalizer::log_ratio())
    }

    fn composite(
        &self,
        request: &RenderRequest,
        layers: &[(LayerKind, NormalizedLayer)],
        pass: &mut Pass,
    ) -> Option<CompositeOverlay> {
        let weights: Vec<f64> = layers
            .iter()
            .map(|(kind, _)| request.weights.resolve(*kind, &request.layers))
            .collect();
        let inputs: Vec<LayerInput<'_>> = layers
            .iter()
            .zip(&weights)
            .map(|((kind, layer), w)| LayerInput::new(kind.id(), layer, *w))
            .collect();

        match blend(&inputs) {
            Ok(composite) => {
                let overlay = Overlay::new(
                    COMPOSITE_ID,
                    "Composite Suitability",
                    composite.points,
                    &self.styles.composite(),
                );
                Some(CompositeOverlay {
                    overlay,
                    weights: composite.weights.into_iter().collect(),
                })
            }
            Err(e) => {
                pass.warn(format!("Composite: {}", e));
                None
            }
        }
    }

    /// Country shapes, loaded at most once per pass.
    async fn countries_for_pass(&self, pass: &mut Pass) -> SharedShapes {
        if let Some(shapes) = &pass.shapes {
            return shapes.clone();
        }
        let shapes = self.countries().await.map_err(Arc::new);
        pass.shapes = Some(shapes.clone());
        shapes
    }

    async fn countries(&self) -> Result<Arc<Vec<CountryShape>>, GeoError> {
        let mut slot = self.countries.lock().await;
        if let Some(shapes) = slot.as_ref() {
            return Ok(shapes.clone());
        }

        let text = self
            .sources
            .geometry
            .load()
            .await
            .map_err(|e| GeoError::Unavailable(e.to_string()))?;
        let shapes = Arc::new(parse_countries(&text)?);
        info!(
            countries = shapes.len(),
            source = %self.sources.geometry.describe(),
            "Loaded country geometry"
        );

        *slot = Some(shapes.clone());
        Ok(shapes)
    }

    /// Cached centroids, or a rebuild from geometry written back to the cache.
    async fn centroid_map(&self, pass: &mut Pass) -> Result<CentroidMap, Arc<GeoError>> {
        if let Some(map) = self.centroids.cached() {
            debug!(countries = map.len(), "Using cached centroids");
            return Ok(map);
        }

        let shapes = self.countries_for_pass(pass).await?;
        match self.centroids.rebuild(&shapes) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(error = %e, "Failed to persist centroids");
                Ok(CentroidStore::build(&shapes))
            }
        }
    }
}

fn normalize_or_warn(
    pass: &mut Pass,
    kind: LayerKind,
    samples: &[SamplePoint],
    normalizer: Normalizer,
) -> Option<NormalizedLayer> {
    match normalizer.normalize(samples) {
        Ok(layer) => Some(layer),
        Err(Degenerate::Empty) => {
            pass.warn(format!("{}: no data to display", kind.title()));
            None
        }
        Err(e @ Degenerate::Constant { .. }) => {
            pass.warn(format!("{}: cannot scale layer, {}", kind.title(), e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(id: &str) -> Overlay {
        Overlay::new(id, id, vec![], &map_common::HeatmapStyle::default_for(LayerKind::Solar))
    }

    #[test]
    fn test_output_overlay_lookup() {
        let output = RenderOutput {
            pass_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            overlays: vec![overlay("solar")],
            ranges: vec![],
            composite: Some(CompositeOverlay {
                overlay: overlay(COMPOSITE_ID),
                weights: BTreeMap::new(),
            }),
            status: vec![StatusMessage::info("ok"), StatusMessage::warning("careful")],
        };

        assert_eq!(output.overlay("solar").map(|o| o.id.as_str()), Some("solar"));
        assert_eq!(output.overlay("composite").map(|o| o.id.as_str()), Some("composite"));
        assert!(output.overlay("co2").is_none());
        assert_eq!(output.warnings().count(), 1);
    }

    #[test]
    fn test_composite_serializes_flat() {
        let composite = CompositeOverlay {
            overlay: overlay(COMPOSITE_ID),
            weights: BTreeMap::from([("solar".to_string(), 0.6), ("co2".to_string(), 0.4)]),
        };
        let json = serde_json::to_value(&composite).unwrap();
        assert_eq!(json["id"], "composite");
        assert_eq!(json["weights"]["co2"], 0.4);
        assert!(json["options"].is_object());
    }

    #[test]
    fn test_degenerate_layers_become_warnings() {
        let mut pass = Pass {
            status: Vec::new(),
            shapes: None,
        };
        let constant = [SamplePoint::new(0.0, 0.0, 5.0), SamplePoint::new(1.0, 1.0, 5.0)];

        assert!(normalize_or_warn(&mut pass, LayerKind::Solar, &[], Normalizer::min_max()).is_none());
        assert!(normalize_or_warn(&mut pass, LayerKind::Co2, &constant, Normalizer::min_max()).is_none());

        assert_eq!(pass.status.len(), 2);
        assert!(pass.status.iter().all(|s| s.is_warning()));
        assert!(pass.status[0].text.contains("no data"));
    }
}
