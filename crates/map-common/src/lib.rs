//! Common types and utilities shared across the terra-map crates.

pub mod bbox;
pub mod error;
pub mod layer;
pub mod point;
pub mod status;
pub mod style;

pub use bbox::BoundingBox;
pub use error::{MapError, MapResult};
pub use layer::{LayerKind, LayerSelection, LayerWeights};
pub use point::{CoordKey, LatLon, SamplePoint, WeightedPoint};
pub use status::{StatusLevel, StatusMessage};
pub use style::{Color, ColorStop, GradientConfig, HeatmapStyle, StyleConfig};
