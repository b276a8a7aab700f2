//! HTTP handlers.
//!
//! - [`api`]: layer overlays as JSON and rendered PNGs
//! - [`metrics`]: health check and Prometheus export
//! - [`ui`]: the browser map page
//! - [`common`]: query parsing and error responses

pub mod api;
pub mod common;
pub mod metrics;
pub mod ui;

pub use api::{layers_handler, map_png_handler};
pub use metrics::{health_handler, metrics_handler};
pub use ui::index_handler;
