//! Data ingestion for terra-map layers.
//!
//! Every remote dataset sits behind a small async trait so render passes can
//! be driven by fakes in tests:
//!
//! - [`ClimatologySource`]: per-point solar irradiance (NASA POWER)
//! - [`EmissionsSource`]: per-country CO₂ totals (World Bank API or a local file)
//! - [`GeometrySource`]: country polygons as GeoJSON text (HTTP or a local file)
//!
//! The pipeline density table is static and needs no source.

pub mod config;
pub mod emissions;
pub mod error;
pub mod geometry;
pub mod pipelines;
pub mod solar;

// Re-exports
pub use config::{EmissionsConfig, GeometryConfig, PowerConfig};
pub use emissions::{
    CountryRecord, EmissionRow, EmissionsSource, LocalEmissionsFile, WorldBankClient,
};
pub use error::{FetchError, IngestionError, Result};
pub use geometry::{GeometrySource, HttpGeometry, LocalGeometryFile};
pub use pipelines::{pipeline_samples, PipelineCountry, PIPELINE_COUNTRIES};
pub use solar::{
    ClimatologySource, PowerClient, SampleOutcome, SampleProgress, SolarSampler,
};
