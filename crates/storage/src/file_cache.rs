//! Generic JSON file cache with atomic replacement.

use metrics::counter;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised by file caches.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize cache payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Payloads that can report emptiness. An empty payload never counts as a hit.
pub trait CachePayload {
    fn is_empty_payload(&self) -> bool;
}

impl<T> CachePayload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> CachePayload for HashMap<K, V> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> CachePayload for BTreeMap<K, V> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

/// A single-value cache.
///
/// Invalidation is explicit: nothing is ever evicted implicitly, callers
/// consult `is_stale` and decide whether to rebuild.
pub trait Cache {
    type Value;

    /// Read the cached value. `Ok(None)` when nothing is stored.
    fn get(&self) -> CacheResult<Option<Self::Value>>;

    /// Replace the cached value.
    fn put(&self, value: &Self::Value) -> CacheResult<()>;

    /// True when the cache holds no usable value.
    fn is_stale(&self) -> bool;

    /// Remove the cached value.
    fn clear(&self) -> CacheResult<()>;
}

/// JSON document stored at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileCache<T> {
    path: PathBuf,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileCache<T>
where
    T: Serialize + DeserializeOwned + CachePayload,
{
    /// Create a cache at `path`. `name` labels log lines and metrics.
    pub fn new(name: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            name,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Atomically replace the file with `value` serialized as JSON.
    pub fn write<S: Serialize + ?Sized>(&self, value: &S) -> CacheResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.io_err(e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.io_err(e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, value)?;
            writer.flush().map_err(|e| self.io_err(e))?;
        }
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;

        debug!(cache = self.name, path = %self.path.display(), "Cache written");
        Ok(())
    }

    fn io_err(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T> Cache for JsonFileCache<T>
where
    T: Serialize + DeserializeOwned + CachePayload,
{
    type Value = T;

    fn get(&self) -> CacheResult<Option<T>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                counter!("terra_cache_misses_total", "cache" => self.name).increment(1);
                return Ok(None);
            }
            Err(e) => return Err(self.io_err(e)),
        };

        let value: T = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            CacheError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        if value.is_empty_payload() {
            counter!("terra_cache_misses_total", "cache" => self.name).increment(1);
            return Ok(None);
        }

        counter!("terra_cache_hits_total", "cache" => self.name).increment(1);
        debug!(cache = self.name, path = %self.path.display(), "Cache hit");
        Ok(Some(value))
    }

    fn put(&self, value: &T) -> CacheResult<()> {
        self.write(value)
    }

    fn is_stale(&self) -> bool {
        match self.get() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(e) => {
                warn!(cache = self.name, error = %e, "Unreadable cache treated as stale");
                true
            }
        }
    }

    fn clear(&self) -> CacheResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}
