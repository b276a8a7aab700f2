//! Error types for terra-map.

use thiserror::Error;

/// Result type alias using MapError.
pub type MapResult<T> = Result<T, MapError>;

/// Primary error type for map operations.
#[derive(Debug, Error)]
pub enum MapError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    // === Data Errors ===
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    // === Storage Errors ===
    #[error("Cache error: {0}")]
    CacheError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl MapError {
    /// Shorthand for [`MapError::InvalidParameter`].
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        MapError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            MapError::InvalidParameter { .. }
            | MapError::UnknownLayer(_) => 400,

            MapError::DataNotAvailable(_) => 404,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for MapError {
    fn from(err: std::io::Error) -> Self {
        MapError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for MapError {
    fn from(err: serde_json::Error) -> Self {
        MapError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MapError::invalid("lat_step", "must be positive").http_status_code(), 400);
        assert_eq!(MapError::UnknownLayer("wind".into()).http_status_code(), 400);
        assert_eq!(MapError::RenderError("x".into()).http_status_code(), 500);
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = MapError::invalid("skip_factor", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter value for 'skip_factor': must be at least 1"
        );
    }
}
