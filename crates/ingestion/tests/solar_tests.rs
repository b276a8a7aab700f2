//! Solar sampling against a fake climatology source.

use async_trait::async_trait;
use ingestion::{ClimatologySource, FetchError, SampleProgress, SolarSampler};
use map_common::LatLon;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use storage::{Cache, PointCache};
use test_utils::cache_dir;

/// Deterministic source: `100 + lat + lon / 10`, timing out on the equator.
#[derive(Default)]
struct FakePower {
    calls: AtomicUsize,
}

#[async_trait]
impl ClimatologySource for FakePower {
    async fn fetch_point(&self, point: LatLon) -> Result<f64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if point.lat == 0.0 {
            return Err(FetchError::Timeout {
                url: format!("fake://{},{}", point.lat, point.lon),
            });
        }
        Ok(100.0 + point.lat + point.lon / 10.0)
    }
}

fn grid() -> Vec<LatLon> {
    // 3 x 3, row-major
    let mut out = Vec::new();
    for lat in [-90.0, 0.0, 90.0] {
        for lon in [-180.0, 0.0, 180.0] {
            out.push(LatLon::new(lat, lon));
        }
    }
    out
}

#[tokio::test]
async fn test_failed_points_are_dropped() {
    let dir = cache_dir();
    let source = Arc::new(FakePower::default());
    let sampler = SolarSampler::new(source.clone(), PointCache::in_dir(dir.path()));

    let outcome = sampler.sample(&grid(), 1, None).await.unwrap();

    assert!(!outcome.from_cache);
    assert_eq!(outcome.attempted, 9);
    assert_eq!(outcome.failed, 3);
    assert_eq!(outcome.points.len(), 6);
    assert!(outcome.points.iter().all(|p| p.lat != 0.0));
    assert_eq!(source.calls.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_skip_factor_uses_one_based_positions() {
    let dir = cache_dir();
    let source = Arc::new(FakePower::default());
    let sampler = SolarSampler::new(source.clone(), PointCache::in_dir(dir.path()));

    let outcome = sampler.sample(&grid(), 2, None).await.unwrap();

    // Positions 2, 4, 6, 8 → indices 1, 3, 5, 7
    assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    let lons: Vec<(f64, f64)> = outcome.points.iter().map(|p| (p.lat, p.lon)).collect();
    // (0,-180) and (0,180) fail on the equator
    assert_eq!(lons, vec![(-90.0, 0.0), (90.0, 0.0)]);
}

#[tokio::test]
async fn test_cache_short_circuits_network() {
    let dir = cache_dir();
    let first = Arc::new(FakePower::default());
    SolarSampler::new(first.clone(), PointCache::in_dir(dir.path()))
        .sample(&grid(), 1, None)
        .await
        .unwrap();

    let second = Arc::new(FakePower::default());
    let sampler = SolarSampler::new(second.clone(), PointCache::in_dir(dir.path()));
    let outcome = sampler.sample(&grid(), 1, None).await.unwrap();

    assert!(outcome.from_cache);
    assert_eq!(outcome.points.len(), 6);
    assert_eq!(second.calls.load(Ordering::SeqCst), 0);

    // Clearing forces a refetch
    sampler.cache().clear().unwrap();
    let outcome = sampler.sample(&grid(), 1, None).await.unwrap();
    assert!(!outcome.from_cache);
    assert_eq!(second.calls.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_malformed_cache_is_refetched() {
    let dir = cache_dir();
    let cache = PointCache::in_dir(dir.path());
    std::fs::write(cache.path(), "not json").unwrap();

    let source = Arc::new(FakePower::default());
    let outcome = SolarSampler::new(source.clone(), cache)
        .sample(&grid(), 1, None)
        .await
        .unwrap();
    assert!(!outcome.from_cache);
    assert_eq!(source.calls.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_progress_reported_per_request() {
    let dir = cache_dir();
    let sampler = SolarSampler::new(Arc::new(FakePower::default()), PointCache::in_dir(dir.path()));

    let seen: Mutex<Vec<SampleProgress>> = Mutex::new(Vec::new());
    let record: &(dyn Fn(SampleProgress) + Send + Sync) = &|p| seen.lock().unwrap().push(p);
    sampler.sample(&grid(), 3, Some(record)).await.unwrap();

    let seen = seen.into_inner().unwrap();
    let positions: Vec<usize> = seen.iter().map(|p| p.position).collect();
    assert_eq!(positions, vec![3, 6, 9]);
    assert_eq!(seen.last().unwrap().fraction(), 1.0);
    assert_eq!(seen.last().unwrap().failed, 1);
}

#[tokio::test]
async fn test_zero_skip_factor_rejected() {
    let dir = cache_dir();
    let sampler = SolarSampler::new(Arc::new(FakePower::default()), PointCache::in_dir(dir.path()));
    assert!(sampler.sample(&grid(), 0, None).await.is_err());
}
