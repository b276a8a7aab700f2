//! Heatmap rendering for terra-map overlays.
//!
//! - [`heatmap`]: splat weighted points with a Gaussian kernel onto an
//!   equirectangular raster and colour the density through a gradient
//! - [`overlay`]: the same overlay described as JSON for the browser widget
//! - [`png`]: RGBA PNG encoding

pub mod error;
pub mod gradient;
pub mod heatmap;
pub mod overlay;
pub mod png;

pub use error::{RenderError, RenderResult};
pub use gradient::Palette;
pub use heatmap::{render_heatmap, DensityGrid, Raster, RgbaImage};
pub use overlay::{Overlay, OverlayOptions};
