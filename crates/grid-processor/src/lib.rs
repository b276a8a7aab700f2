//! Grid processing for suitability overlays.
//!
//! Three stages turn raw samples into a blended heat layer:
//!
//! ```text
//! GridGenerator::generate(lat_step, lon_step)      (memoized lattice)
//!      │
//!      ▼
//! sampled SamplePoints ──► Normalizer::normalize ──► NormalizedLayer
//!                                                        │
//! other layers (per-country values) ──► Normalizer ──────┤
//!                                                        ▼
//!                                         composite::blend(layers, weights)
//!                                                        │
//!                                                        ▼
//!                                          Vec<WeightedPoint> (intensity)
//! ```

pub mod composite;
pub mod error;
pub mod grid;
pub mod normalize;

pub use composite::{blend, Composite, LayerInput};
pub use error::{CompositeError, Degenerate};
pub use grid::{generate_grid, GridGenerator, GridStats};
pub use normalize::{NormalizedLayer, Normalizer, Scaling};
