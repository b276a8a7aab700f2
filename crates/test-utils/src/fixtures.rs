//! Canned documents for tests.
//!
//! Country geometries are axis-aligned squares so that vertex means and
//! containment are easy to compute by hand.

use serde_json::{json, Value};

/// Closed outer ring of an axis-aligned rectangle, `[lon, lat]` order.
pub fn rect_ring(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Value {
    json!([
        [min_lon, min_lat],
        [max_lon, min_lat],
        [max_lon, max_lat],
        [min_lon, max_lat],
        [min_lon, min_lat]
    ])
}

/// Polygon feature named through the `ADMIN` property.
pub fn polygon_feature(name: &str, ring: Value) -> Value {
    json!({
        "type": "Feature",
        "properties": { "ADMIN": name },
        "geometry": { "type": "Polygon", "coordinates": [ring] }
    })
}

/// MultiPolygon feature with one outer ring per part.
pub fn multipolygon_feature(name: &str, rings: Vec<Value>) -> Value {
    let parts: Vec<Value> = rings.into_iter().map(|r| json!([r])).collect();
    json!({
        "type": "Feature",
        "properties": { "ADMIN": name },
        "geometry": { "type": "MultiPolygon", "coordinates": parts }
    })
}

pub fn feature_collection(features: Vec<Value>) -> String {
    json!({ "type": "FeatureCollection", "features": features }).to_string()
}

/// Small world used across geodata and service tests.
///
/// | Country | Shape | Vertex mean (lat, lon) |
/// |---|---|---|
/// | France | rect lon 0..10, lat 40..50 | (44, 4) |
/// | United States of America | 5-vertex rect + 6-vertex ring | (35, -103.33) |
/// | Côte d’Ivoire | rect lon -8..-3, lat 5..10 | (7, -6) |
/// | Palestine | rect lon 34..36, lat 31..33, `name` property | (31.8, 34.8) |
///
/// Plus one `Point` feature that must be ignored. The point (0, -150) is
/// open ocean.
pub fn world_geojson() -> String {
    feature_collection(vec![
        polygon_feature("France", rect_ring(0.0, 40.0, 10.0, 50.0)),
        multipolygon_feature(
            "United States of America",
            vec![
                rect_ring(-160.0, 18.0, -150.0, 24.0),
                json!([
                    [-120.0, 30.0],
                    [-100.0, 30.0],
                    [-80.0, 30.0],
                    [-80.0, 45.0],
                    [-120.0, 45.0],
                    [-120.0, 30.0]
                ]),
            ],
        ),
        polygon_feature("Côte d’Ivoire", rect_ring(-8.0, 5.0, -3.0, 10.0)),
        json!({
            "type": "Feature",
            "properties": { "name": "Palestine" },
            "geometry": { "type": "Polygon", "coordinates": [rect_ring(34.0, 31.0, 36.0, 33.0)] }
        }),
        json!({
            "type": "Feature",
            "properties": { "ADMIN": "Nowhere" },
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] }
        }),
    ])
}

/// NASA POWER climatology response carrying the given periodic values.
pub fn power_response(values: &[(&str, f64)]) -> String {
    let parameter: serde_json::Map<String, Value> = values
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [0.0, 0.0, 0.0] },
        "properties": { "parameter": { "ALLSKY_SFC_SW_DWN": parameter } }
    })
    .to_string()
}

/// World Bank v2 indicator response: `[meta, rows]`.
pub fn world_bank_response(rows: &[(&str, &str, Option<f64>)]) -> String {
    let rows: Vec<Value> = rows
        .iter()
        .map(|(name, iso3, value)| {
            json!({
                "indicator": { "id": "EN.GHG.CO2.MT.CE.AR5", "value": "Carbon dioxide (CO2) emissions" },
                "country": { "id": &iso3[..2.min(iso3.len())], "value": name },
                "countryiso3code": iso3,
                "date": "2023",
                "value": value,
                "unit": "",
                "obs_status": "",
                "decimal": 1
            })
        })
        .collect();
    json!([
        { "page": 1, "pages": 1, "per_page": 1000, "total": rows.len() },
        rows
    ])
    .to_string()
}
