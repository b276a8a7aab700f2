//! Named country shapes from a GeoJSON FeatureCollection.

use geo::{BoundingRect, Geometry, MultiPolygon, Rect};
use geojson::{Feature, GeoJson};
use tracing::{debug, info};

use crate::error::{GeoError, GeoResult};

/// Name properties consulted in order; the first non-empty one wins.
const NAME_PROPERTIES: [&str; 3] = ["ADMIN", "name", "admin"];

/// One named country.
#[derive(Debug, Clone)]
pub struct CountryShape {
    pub name: String,
    /// Every part of the country; a single Polygon becomes a one-part MultiPolygon.
    pub geometry: MultiPolygon<f64>,
    /// `None` only when every ring is empty.
    pub bounds: Option<Rect<f64>>,
}

impl CountryShape {
    /// Outer ring of the part with the most vertices. The first part wins ties.
    pub fn largest_outer_ring(&self) -> Option<&geo::LineString<f64>> {
        let mut best: Option<&geo::LineString<f64>> = None;
        for polygon in &self.geometry.0 {
            let ring = polygon.exterior();
            if best.map_or(true, |b| ring.0.len() > b.0.len()) {
                best = Some(ring);
            }
        }
        best.filter(|ring| !ring.0.is_empty())
    }
}

/// Parse a FeatureCollection into country shapes.
///
/// Features without a name, without geometry, with a geometry other than
/// Polygon/MultiPolygon, or whose geometry cannot be converted are skipped.
/// Fails with [`GeoError::NoCountries`] when nothing usable remains.
pub fn parse_countries(text: &str) -> GeoResult<Vec<CountryShape>> {
    let doc: GeoJson = text.parse()?;
    let collection = match doc {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => return Err(GeoError::NotAFeatureCollection("Feature")),
        GeoJson::Geometry(_) => return Err(GeoError::NotAFeatureCollection("Geometry")),
    };

    let total = collection.features.len();
    let shapes: Vec<CountryShape> = collection.features.into_iter().filter_map(shape_from_feature).collect();

    if shapes.is_empty() {
        return Err(GeoError::NoCountries);
    }

    info!(countries = shapes.len(), features = total, "Parsed country geometries");
    Ok(shapes)
}

fn feature_name(feature: &Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    NAME_PROPERTIES
        .iter()
        .filter_map(|key| props.get(*key).and_then(|v| v.as_str()))
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

fn shape_from_feature(feature: Feature) -> Option<CountryShape> {
    let name = feature_name(&feature)?;
    let value = feature.geometry?.value;

    let geometry: Geometry<f64> = match value.try_into() {
        Ok(g) => g,
        Err(e) => {
            debug!(country = %name, error = %e, "Skipping unconvertible geometry");
            return None;
        }
    };

    let geometry: MultiPolygon<f64> = match geometry {
        Geometry::Polygon(p) => p.into(),
        Geometry::MultiPolygon(m) => m,
        _ => {
            debug!(country = %name, "Skipping non-polygon geometry");
            return None;
        }
    };

    if geometry.0.iter().all(|p| p.exterior().0.is_empty()) {
        debug!(country = %name, "Skipping empty geometry");
        return None;
    }

    let bounds = geometry.bounding_rect();
    Some(CountryShape { name, geometry, bounds })
}
