//! Regular lat/lon sampling lattice.

use lru::LruCache;
use map_common::{LatLon, MapError, MapResult};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Tolerance so that accumulated steps still reach the closing edge (e.g. 90°).
const EDGE_EPSILON: f64 = 1e-9;

/// Number of distinct (lat_step, lon_step) lattices kept in memory.
const DEFAULT_CAPACITY: usize = 16;

/// Upper bound on lattice size; every point may become a network request.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Build the lattice for the given steps.
///
/// Latitudes run `-90, -90+lat_step, ...` up to and including 90 when it falls
/// on a step; longitudes likewise over `[-180, 180]`. Points are ordered
/// row-major: all longitudes of the first latitude, then the next latitude.
pub fn generate_grid(lat_step: f64, lon_step: f64) -> MapResult<Vec<LatLon>> {
    let lats = axis(-90.0, 90.0, lat_step, "lat_step")?;
    let lons = axis(-180.0, 180.0, lon_step, "lon_step")?;

    if lats.len().saturating_mul(lons.len()) > MAX_GRID_POINTS {
        return Err(MapError::invalid(
            "lat_step",
            format!("grid of {}x{} points exceeds {}", lats.len(), lons.len(), MAX_GRID_POINTS),
        ));
    }

    let mut points = Vec::with_capacity(lats.len() * lons.len());
    for &lat in &lats {
        for &lon in &lons {
            points.push(LatLon::new(lat, lon));
        }
    }
    Ok(points)
}

fn axis(start: f64, end: f64, step: f64, param: &str) -> MapResult<Vec<f64>> {
    if !step.is_finite() || step <= 0.0 {
        return Err(MapError::invalid(param, format!("step must be positive, got {}", step)));
    }

    let span = (end - start) / step + EDGE_EPSILON;
    if span > MAX_GRID_POINTS as f64 {
        return Err(MapError::invalid(param, format!("step {} is too small", step)));
    }

    let count = span.floor() as usize + 1;
    Ok((0..count).map(|k| (start + k as f64 * step).min(end)).collect())
}

/// Cache statistics for the lattice memo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizing lattice generator keyed by `(lat_step, lon_step)`.
pub struct GridGenerator {
    cache: Mutex<LruCache<(u64, u64), Arc<Vec<LatLon>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl GridGenerator {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Lattice for the given steps, computed once per distinct step pair.
    pub fn generate(&self, lat_step: f64, lon_step: f64) -> MapResult<Arc<Vec<LatLon>>> {
        let key = (lat_step.to_bits(), lon_step.to_bits());

        if let Some(grid) = self.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(grid));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let grid = Arc::new(generate_grid(lat_step, lon_step)?);
        debug!(lat_step, lon_step, points = grid.len(), "Generated sampling grid");

        self.lock().put(key, Arc::clone(&grid));
        Ok(grid)
    }

    pub fn stats(&self) -> GridStats {
        GridStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.lock().len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<(u64, u64), Arc<Vec<LatLon>>>> {
        // A poisoned memo only holds immutable lattices; keep using it.
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_counts_match_arange() {
        // Same counts as arange(-90, 91, step) / arange(-180, 181, step)
        assert_eq!(generate_grid(20.0, 20.0).unwrap().len(), 10 * 19);
        assert_eq!(generate_grid(50.0, 50.0).unwrap().len(), 4 * 8);
        assert_eq!(generate_grid(90.0, 180.0).unwrap().len(), 9);
    }

    #[test]
    fn test_fractional_step_reaches_edge() {
        let grid = generate_grid(0.1, 360.0).unwrap();
        // 1801 latitudes x 2 longitudes
        assert_eq!(grid.len(), 1801 * 2);
        let last = grid.last().unwrap();
        assert!((last.lat - 90.0).abs() < 1e-6);
        assert_eq!(last.lon, 180.0);
    }

    #[test]
    fn test_row_major_order() {
        let grid = generate_grid(90.0, 180.0).unwrap();
        assert_eq!(grid[0], LatLon::new(-90.0, -180.0));
        assert_eq!(grid[1], LatLon::new(-90.0, 0.0));
        assert_eq!(grid[3], LatLon::new(0.0, -180.0));
        assert_eq!(grid[8], LatLon::new(90.0, 180.0));
    }

    #[test]
    fn test_rejects_bad_steps() {
        assert!(generate_grid(0.0, 10.0).is_err());
        assert!(generate_grid(10.0, -5.0).is_err());
        assert!(generate_grid(f64::NAN, 10.0).is_err());
        assert!(generate_grid(10.0, f64::INFINITY).is_err());
        assert!(generate_grid(1e-9, 10.0).is_err());
        assert!(generate_grid(0.01, 0.01).is_err());
    }

    #[test]
    fn test_generator_memoizes() {
        let generator = GridGenerator::new();
        let a = generator.generate(30.0, 30.0).unwrap();
        let b = generator.generate(30.0, 30.0).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let stats = generator.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_generator_evicts_oldest() {
        let generator = GridGenerator::with_capacity(1);
        let a = generator.generate(30.0, 30.0).unwrap();
        generator.generate(45.0, 45.0).unwrap();
        let c = generator.generate(30.0, 30.0).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(*a, *c);
    }
}
