//! Country-level geodata for terra-map.
//!
//! - [`countries`]: parse a GeoJSON FeatureCollection into named shapes
//! - [`centroid`]: vertex-mean centroids, persisted through the centroid cache
//! - [`resolver`]: map dataset country names onto geometry names
//! - [`land_mask`]: point-in-land test with a fail-open fallback

pub mod aliases;
pub mod centroid;
pub mod countries;
pub mod error;
pub mod land_mask;
pub mod resolver;

pub use centroid::{vertex_mean_centroid, CentroidStore};
pub use countries::{parse_countries, CountryShape};
pub use error::{GeoError, GeoResult};
pub use land_mask::{select_land_mask, AlwaysTrue, LandMask, PolygonBacked};
pub use resolver::resolve;
