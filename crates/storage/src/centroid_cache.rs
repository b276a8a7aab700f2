//! Cache of country centroids keyed by canonical (admin) name.

use map_common::LatLon;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::file_cache::{Cache, CacheResult, JsonFileCache};

/// Default file name inside the cache directory.
pub const CENTROID_CACHE_FILE: &str = "country_coords_ne.json";

/// Canonical country name to representative point.
pub type CentroidMap = BTreeMap<String, LatLon>;

/// Centroids persisted as a JSON object `{"Name": [lat, lon], ...}`.
#[derive(Debug, Clone)]
pub struct CentroidCache {
    inner: JsonFileCache<CentroidMap>,
}

impl CentroidCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: JsonFileCache::new("country_centroids", path),
        }
    }

    /// Cache located at `dir/country_coords_ne.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CENTROID_CACHE_FILE))
    }

    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Load cached centroids, treating an unreadable file as absent.
    pub fn load(&self) -> Option<CentroidMap> {
        match self.inner.get() {
            Ok(Some(map)) => {
                info!(countries = map.len(), path = %self.path().display(), "Loaded cached centroids");
                Some(map)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable centroid cache");
                None
            }
        }
    }

    pub fn store(&self, map: &CentroidMap) -> CacheResult<()> {
        self.inner.put(map)?;
        info!(countries = map.len(), path = %self.path().display(), "Cached centroids");
        Ok(())
    }
}

impl Cache for CentroidCache {
    type Value = CentroidMap;

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
