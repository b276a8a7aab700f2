//! Point-in-land classification.

use geo::{Intersects, MultiPolygon, Point, Rect};
use map_common::{LatLon, SamplePoint, StatusMessage};
use std::sync::Arc;
use tracing::{info, warn};

use crate::countries::CountryShape;
use crate::error::GeoError;

/// Decides whether a coordinate lies on land.
pub trait LandMask: Send + Sync {
    fn is_land(&self, point: LatLon) -> bool;

    /// Short label for logs and status output.
    fn kind(&self) -> &'static str;

    /// Keep only the samples that lie on land, preserving order.
    fn retain_land(&self, samples: Vec<SamplePoint>) -> Vec<SamplePoint> {
        samples
            .into_iter()
            .filter(|s| self.is_land(s.position()))
            .collect()
    }
}

/// Mask backed by country polygons. Points on a boundary count as land.
pub struct PolygonBacked {
    shapes: Vec<(Rect<f64>, MultiPolygon<f64>)>,
}

impl PolygonBacked {
    pub fn new(shapes: &[CountryShape]) -> Self {
        let shapes = shapes
            .iter()
            .filter_map(|s| s.bounds.map(|b| (b, s.geometry.clone())))
            .collect();
        Self { shapes }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl LandMask for PolygonBacked {
    fn is_land(&self, point: LatLon) -> bool {
        let p = Point::new(point.lon, point.lat);
        self.shapes
            .iter()
            .any(|(bounds, geometry)| bounds.intersects(&p) && geometry.intersects(&p))
    }

    fn kind(&self) -> &'static str {
        "polygon"
    }
}

/// Fail-open mask used when no geometry is available: every point is land.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysTrue;

impl LandMask for AlwaysTrue {
    fn is_land(&self, _point: LatLon) -> bool {
        true
    }

    fn kind(&self) -> &'static str {
        "always-true"
    }
}

/// Choose the mask for a render pass.
///
/// Polygons that failed to load, or that contain no usable shape, yield
/// [`AlwaysTrue`] together with a warning for the user.
pub fn select_land_mask(
    shapes: Result<&[CountryShape], &GeoError>,
) -> (Arc<dyn LandMask>, Option<StatusMessage>) {
    match shapes {
        Ok(shapes) => {
            let mask = PolygonBacked::new(shapes);
            if mask.is_empty() {
                warn!("Country geometry is empty, land filter disabled");
                return (
                    Arc::new(AlwaysTrue),
                    Some(StatusMessage::warning(
                        "Country geometry is empty; land-only filtering is disabled",
                    )),
                );
            }
            info!(countries = mask.len(), "Land mask ready");
            (Arc::new(mask), None)
        }
        Err(e) => {
            warn!(error = %e, "Country geometry unavailable, land filter disabled");
            (
                Arc::new(AlwaysTrue),
                Some(StatusMessage::warning(format!(
                    "Country geometry unavailable ({}); land-only filtering is disabled",
                    e
                ))),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centroid::vertex_mean_centroid;
    use crate::countries::parse_countries;
    use test_utils::world_geojson;

    #[test]
    fn test_centroid_is_land() {
        let shapes = parse_countries(&world_geojson()).unwrap();
        let mask = PolygonBacked::new(&shapes);
        let france = vertex_mean_centroid(&shapes[0]).unwrap();
        assert!(mask.is_land(france));
    }

    #[test]
    fn test_open_ocean_is_not_land() {
        let shapes = parse_countries(&world_geojson()).unwrap();
        let mask = PolygonBacked::new(&shapes);
        assert!(!mask.is_land(LatLon::new(0.0, -150.0)));
    }

    #[test]
    fn test_boundary_counts_as_land() {
        let shapes = parse_countries(&world_geojson()).unwrap();
        let mask = PolygonBacked::new(&shapes);
        assert!(mask.is_land(LatLon::new(40.0, 5.0)));
        assert!(mask.is_land(LatLon::new(50.0, 10.0)));
    }

    #[test]
    fn test_fail_open() {
        let err = GeoError::NoCountries;
        let (mask, warning) = select_land_mask(Err(&err));
        assert_eq!(mask.kind(), "always-true");
        assert!(mask.is_land(LatLon::new(0.0, -150.0)));
        assert!(warning.unwrap().is_warning());
    }

    #[test]
    fn test_retain_land_preserves_order() {
        let shapes = parse_countries(&world_geojson()).unwrap();
        let (mask, warning) = select_land_mask(Ok(&shapes));
        assert!(warning.is_none());

        let kept = mask.retain_land(vec![
            SamplePoint::new(45.0, 5.0, 1.0),
            SamplePoint::new(0.0, -150.0, 2.0),
            SamplePoint::new(7.0, -6.0, 3.0),
        ]);
        let values: Vec<f64> = kept.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![1.0, 3.0]);
    }
}
