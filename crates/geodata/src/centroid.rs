//! Country centroids.
//!
//! The centroid of a country is approximated by the arithmetic mean of the
//! vertices of one outer ring (the largest part for MultiPolygons, closing
//! vertex included). This is not an area-weighted centroid: it is biased
//! towards detailed coastlines and may fall outside concave shapes.

use map_common::LatLon;
use std::path::Path;
use storage::centroid_cache::CentroidMap;
use storage::{Cache, CacheResult, CentroidCache};
use tracing::{debug, info};

use crate::countries::CountryShape;
use crate::error::GeoResult;

/// Vertex-mean centroid of the shape's largest outer ring.
pub fn vertex_mean_centroid(shape: &CountryShape) -> Option<LatLon> {
    let ring = shape.largest_outer_ring()?;
    let n = ring.0.len() as f64;
    let (sum_lon, sum_lat) = ring
        .0
        .iter()
        .fold((0.0, 0.0), |(x, y), c| (x + c.x, y + c.y));
    let centroid = LatLon::new(sum_lat / n, sum_lon / n);
    centroid.is_valid().then_some(centroid)
}

/// Centroid map backed by the on-disk centroid cache.
#[derive(Debug, Clone)]
pub struct CentroidStore {
    cache: CentroidCache,
}

impl CentroidStore {
    pub fn new(cache: CentroidCache) -> Self {
        Self { cache }
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(CentroidCache::in_dir(dir))
    }

    /// Previously persisted centroids, if the cache file is present and readable.
    pub fn cached(&self) -> Option<CentroidMap> {
        self.cache.load()
    }

    /// Compute centroids for every shape. Later duplicates of a name overwrite earlier ones.
    pub fn build(shapes: &[CountryShape]) -> CentroidMap {
        let mut map = CentroidMap::new();
        for shape in shapes {
            match vertex_mean_centroid(shape) {
                Some(c) => {
                    map.insert(shape.name.clone(), c);
                }
                None => debug!(country = %shape.name, "No centroid for shape"),
            }
        }
        map
    }

    /// Compute centroids and persist them, replacing any cached file.
    pub fn rebuild(&self, shapes: &[CountryShape]) -> GeoResult<CentroidMap> {
        let map = Self::build(shapes);
        self.cache.store(&map)?;
        info!(countries = map.len(), "Rebuilt country centroids");
        Ok(map)
    }

    pub fn clear(&self) -> CacheResult<()> {
        self.cache.clear()
    }
}
