//! Geographic point types.
//!
//! All coordinates are WGS84 degrees: latitude in [-90, 90], longitude in
//! [-180, 180].

use serde::{Deserialize, Serialize};

/// Quantization applied when comparing coordinates for co-location (1e-6°).
const COORD_SCALE: f64 = 1_000_000.0;

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// True if both components are finite and inside the geographic range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    pub fn key(&self) -> CoordKey {
        CoordKey::new(self.lat, self.lon)
    }
}

impl From<(f64, f64)> for LatLon {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<LatLon> for (f64, f64) {
    fn from(p: LatLon) -> Self {
        (p.lat, p.lon)
    }
}

/// A grid point with a sampled raw value.
///
/// Serialized as a `[lat, lon, value]` triple, which is the point cache format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64, f64)", into = "(f64, f64, f64)")]
pub struct SamplePoint {
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
}

impl SamplePoint {
    pub fn new(lat: f64, lon: f64, value: f64) -> Self {
        Self { lat, lon, value }
    }

    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

impl From<(f64, f64, f64)> for SamplePoint {
    fn from((lat, lon, value): (f64, f64, f64)) -> Self {
        Self { lat, lon, value }
    }
}

impl From<SamplePoint> for (f64, f64, f64) {
    fn from(p: SamplePoint) -> Self {
        (p.lat, p.lon, p.value)
    }
}

/// A point with a normalized weight in [0, 1].
///
/// Serialized as `[lat, lon, weight]`, the layout heatmap widgets expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64, f64)", into = "(f64, f64, f64)")]
pub struct WeightedPoint {
    pub lat: f64,
    pub lon: f64,
    pub weight: f64,
}

impl WeightedPoint {
    pub fn new(lat: f64, lon: f64, weight: f64) -> Self {
        Self { lat, lon, weight }
    }

    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

impl From<(f64, f64, f64)> for WeightedPoint {
    fn from((lat, lon, weight): (f64, f64, f64)) -> Self {
        Self { lat, lon, weight }
    }
}

impl From<WeightedPoint> for (f64, f64, f64) {
    fn from(p: WeightedPoint) -> Self {
        (p.lat, p.lon, p.weight)
    }
}

/// Hashable coordinate identity, quantized to 1e-6 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey {
    lat: i64,
    lon: i64,
}

impl CoordKey {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat: (lat * COORD_SCALE).round() as i64,
            lon: (lon * COORD_SCALE).round() as i64,
        }
    }
}
