//! Storage abstractions for terra-map.
//!
//! Provides small JSON file caches:
//! - Point cache: sampled solar grid points as `[lat, lon, value]` triples
//! - Centroid cache: canonical country name to `[lat, lon]`
//!
//! Writes go to a temporary file in the same directory and are atomically
//! renamed over the target, so concurrent sessions never read a torn file.

pub mod centroid_cache;
pub mod file_cache;
pub mod point_cache;

pub use centroid_cache::CentroidCache;
pub use file_cache::{Cache, CacheError, CachePayload, CacheResult, JsonFileCache};
pub use point_cache::PointCache;
