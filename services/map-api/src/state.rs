//! Application state and shared resources.

use anyhow::Result;

use crate::config::MapConfig;
use crate::session::RenderEngine;

/// Shared application state.
pub struct AppState {
    pub engine: RenderEngine,
    pub config: MapConfig,
}

impl AppState {
    pub fn new(config: MapConfig) -> Result<Self> {
        let engine = RenderEngine::from_config(&config)?;
        Ok(Self { engine, config })
    }

    /// State around an already-built engine (tests, custom sources).
    pub fn with_engine(engine: RenderEngine, config: MapConfig) -> Self {
        Self { engine, config }
    }
}
