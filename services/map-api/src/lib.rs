//! Suitability map service library.
//!
//! This module exposes the internal modules for testing purposes.

pub mod config;
pub mod handlers;
pub mod server;
pub mod session;
pub mod state;

pub use config::{MapConfig, SamplingConfig};
pub use server::build_router;
pub use session::{RenderEngine, RenderOutput, RenderRequest, Sources};
pub use state::AppState;
