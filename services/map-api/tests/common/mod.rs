//! Common test utilities for map-api tests
//!
//! Provides in-memory sources for:
//! - Solar irradiance: `100 + lat + lon / 10` at every point
//! - Emissions: a fixed row list, or a failing source
//! - Country geometry: the shared world fixture, or a failing source

#![allow(dead_code)]

use async_trait::async_trait;
use ingestion::{
    ClimatologySource, EmissionRow, EmissionsSource, FetchError, GeometrySource, IngestionError,
};
use map_api::{RenderEngine, SamplingConfig, Sources};
use map_common::{LatLon, StyleConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use test_utils::{cache_dir, world_geojson};

#[derive(Default)]
pub struct FakePower {
    pub calls: AtomicUsize,
}

impl FakePower {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClimatologySource for FakePower {
    async fn fetch_point(&self, point: LatLon) -> Result<f64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(100.0 + point.lat + point.lon / 10.0)
    }
}

pub struct FakeEmissions {
    rows: Option<Vec<EmissionRow>>,
}

#[async_trait]
impl EmissionsSource for FakeEmissions {
    async fn fetch(&self) -> ingestion::Result<Vec<EmissionRow>> {
        match &self.rows {
            Some(rows) => Ok(rows.clone()),
            None => Err(IngestionError::Fetch(FetchError::Timeout {
                url: "fake://emissions".to_string(),
            })),
        }
    }

    fn describe(&self) -> String {
        "fake emissions".to_string()
    }
}

pub struct FakeGeometry {
    doc: Option<String>,
    pub loads: AtomicUsize,
}

impl FakeGeometry {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeometrySource for FakeGeometry {
    async fn load(&self) -> ingestion::Result<String> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.doc {
            Some(doc) => Ok(doc.clone()),
            None => Err(IngestionError::Fetch(FetchError::Transport {
                url: "fake://geometry".to_string(),
                message: "connection refused".to_string(),
            })),
        }
    }

    fn describe(&self) -> String {
        "fake geometry".to_string()
    }
}

/// France, United States (aliased), Côte d’Ivoire and one unknown name.
pub fn emission_rows() -> Vec<EmissionRow> {
    [
        ("France", 300.0),
        ("United States", 5000.0),
        ("Côte d’Ivoire", 10.0),
        ("Atlantis", 7.0),
    ]
    .into_iter()
    .map(|(country, co2_total_mt)| EmissionRow {
        country: country.to_string(),
        co2_total_mt,
    })
    .collect()
}

/// A render engine over fake sources, plus handles for inspecting them.
pub struct Harness {
    pub engine: RenderEngine,
    pub power: Arc<FakePower>,
    pub geometry: Arc<FakeGeometry>,
    pub dir: TempDir,
}

pub struct HarnessBuilder {
    step: f64,
    geometry: Option<String>,
    emissions: Option<Vec<EmissionRow>>,
}

impl HarnessBuilder {
    pub fn step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn without_geometry(mut self) -> Self {
        self.geometry = None;
        self
    }

    pub fn without_emissions(mut self) -> Self {
        self.emissions = None;
        self
    }

    pub fn build(self) -> Harness {
        let dir = cache_dir();
        let power = Arc::new(FakePower::default());
        let geometry = Arc::new(FakeGeometry {
            doc: self.geometry,
            loads: AtomicUsize::new(0),
        });

        let sources = Sources {
            climatology: power.clone(),
            emissions: Arc::new(FakeEmissions {
                rows: self.emissions,
            }),
            geometry: geometry.clone(),
        };
        let sampling = SamplingConfig {
            lat_step: self.step,
            lon_step: self.step * 2.0,
            skip_factor: 1,
        };

        Harness {
            engine: RenderEngine::new(sources, dir.path(), sampling, StyleConfig::default()),
            power,
            geometry,
            dir,
        }
    }
}

/// 90° x 180° grid (9 points), world geometry and emissions available.
pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        step: 90.0,
        geometry: Some(world_geojson()),
        emissions: Some(emission_rows()),
    }
}
