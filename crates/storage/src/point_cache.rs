//! Cache of sampled solar grid points.

use map_common::SamplePoint;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::file_cache::{Cache, CacheResult, JsonFileCache};

/// Default file name inside the cache directory.
pub const POINT_CACHE_FILE: &str = "solar_cache.json";

/// Sampled points persisted as a JSON array of `[lat, lon, value]`.
///
/// The cache is not keyed by grid step or skip factor: once a full pass has
/// been written it is reused until cleared by hand.
#[derive(Debug, Clone)]
pub struct PointCache {
    inner: JsonFileCache<Vec<SamplePoint>>,
}

impl PointCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: JsonFileCache::new("solar_points", path),
        }
    }

    /// Cache located at `dir/solar_cache.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(POINT_CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Load cached points, treating an unreadable file as absent.
    pub fn load(&self) -> Option<Vec<SamplePoint>> {
        match self.inner.get() {
            Ok(Some(points)) => {
                info!(count = points.len(), path = %self.path().display(), "Loaded cached solar points");
                Some(points)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable solar point cache");
                None
            }
        }
    }

    pub fn store(&self, points: &[SamplePoint]) -> CacheResult<()> {
        self.inner.write(points)?;
        info!(count = points.len(), path = %self.path().display(), "Cached solar points");
        Ok(())
    }
}

impl Cache for PointCache {
    type Value = Vec<SamplePoint>;

    fn get(&self) -> CacheResult<Option<Self::Value>> {
        self.inner.get()
    }

    fn put(&self, value: &Self::Value) -> CacheResult<()> {
        self.inner.put(value)
    }

    fn is_stale(&self) -> bool {
        self.inner.is_stale()
    }

    fn clear(&self) -> CacheResult<()> {
        self.inner.clear()
    }
}
