use storage::CacheError;
use thiserror::Error;

pub type GeoResult<T> = Result<T, GeoError>;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("Expected a FeatureCollection, got {0}")]
    NotAFeatureCollection(&'static str),

    #[error("No usable country polygons in geometry document")]
    NoCountries,

    /// The geometry document could not be obtained at all.
    #[error("Country geometry unavailable: {0}")]
    Unavailable(String),

    #[error("Centroid cache error: {0}")]
    Cache(#[from] CacheError),
}
