//! Query parsing and error responses shared by the API handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use map_common::{LayerKind, LayerSelection, LayerWeights, MapError, MapResult};
use serde::{Deserialize, Serialize};

use crate::session::{RenderRequest, COMPOSITE_ID};

pub const DEFAULT_WIDTH: u32 = 1440;
pub const DEFAULT_HEIGHT: u32 = 720;
/// Upper bounds for sizes taken from a query string.
pub const MAX_WIDTH: u32 = 2880;
pub const MAX_HEIGHT: u32 = 1440;

// ============================================================================
// Query Parameters
// ============================================================================

/// Query string accepted by `/api/layers` and `/api/map.png`.
#[derive(Debug, Default, Deserialize)]
pub struct MapQuery {
    /// Comma-separated layer ids, e.g. `solar,co2`
    pub layers: Option<String>,
    pub solar_weight: Option<f64>,
    pub co2_weight: Option<f64>,
    pub pipelines_weight: Option<f64>,
    pub land_only: Option<bool>,
    pub composite: Option<bool>,
    /// PNG only: which overlay to draw
    pub overlay: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl MapQuery {
    pub fn to_request(&self) -> MapResult<RenderRequest> {
        let layers = match &self.layers {
            Some(s) => LayerSelection::parse(s)?,
            None => LayerSelection::default(),
        };

        let mut weights = LayerWeights::new();
        for (kind, weight) in [
            (LayerKind::Solar, self.solar_weight),
            (LayerKind::Co2, self.co2_weight),
            (LayerKind::Pipelines, self.pipelines_weight),
        ] {
            if let Some(w) = weight {
                weights.set(kind, w)?;
            }
        }

        Ok(RenderRequest {
            layers,
            weights,
            land_only: self.land_only.unwrap_or(false),
            composite: self.composite.unwrap_or(true),
        })
    }

    /// Overlay id for the PNG endpoint: `composite` or a layer id.
    pub fn overlay_id(&self) -> MapResult<String> {
        match self.overlay.as_deref().map(str::trim) {
            None | Some("") | Some(COMPOSITE_ID) => Ok(COMPOSITE_ID.to_string()),
            Some(other) => Ok(other.parse::<LayerKind>()?.id().to_string()),
        }
    }

    /// Image size, checked against `MAX_WIDTH` x `MAX_HEIGHT`.
    pub fn dimensions(&self) -> MapResult<(u32, u32)> {
        let width = self.width.unwrap_or(DEFAULT_WIDTH);
        let height = self.height.unwrap_or(DEFAULT_HEIGHT);
        if width == 0 || width > MAX_WIDTH {
            return Err(MapError::invalid(
                "width",
                format!("must be between 1 and {}", MAX_WIDTH),
            ));
        }
        if height == 0 || height > MAX_HEIGHT {
            return Err(MapError::invalid(
                "height",
                format!("must be between 1 and {}", MAX_HEIGHT),
            ));
        }
        Ok((width, height))
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// JSON error response with the status code the error maps to.
pub fn error_response(err: &MapError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    }
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let request = MapQuery::default().to_request().unwrap();
        assert_eq!(request, RenderRequest::default());
        assert_eq!(MapQuery::default().dimensions().unwrap(), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!(MapQuery::default().overlay_id().unwrap(), "composite");
    }

    #[test]
    fn test_query_to_request() {
        let query = MapQuery {
            layers: Some("co2,solar".to_string()),
            solar_weight: Some(0.8),
            land_only: Some(true),
            ..Default::default()
        };
        let request = query.to_request().unwrap();

        assert_eq!(
            request.layers.iter().collect::<Vec<_>>(),
            vec![LayerKind::Co2, LayerKind::Solar]
        );
        assert_eq!(request.weights.explicit(LayerKind::Solar), Some(0.8));
        assert_eq!(request.weights.explicit(LayerKind::Co2), None);
        assert!(request.land_only);
    }

    #[test]
    fn test_query_rejects_bad_input() {
        let unknown = MapQuery {
            layers: Some("solar,wind".to_string()),
            ..Default::default()
        };
        assert!(matches!(unknown.to_request(), Err(MapError::UnknownLayer(_))));

        let nan = MapQuery {
            co2_weight: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(nan.to_request(), Err(MapError::InvalidParameter { .. })));

        let overlay = MapQuery {
            overlay: Some("clouds".to_string()),
            ..Default::default()
        };
        assert!(overlay.overlay_id().is_err());
    }

    #[test]
    fn test_dimensions_bounded() {
        let query = |width, height| MapQuery {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        };
        assert_eq!(query(MAX_WIDTH, MAX_HEIGHT).dimensions().unwrap(), (MAX_WIDTH, MAX_HEIGHT));
        assert!(matches!(
            query(8192, 720).dimensions(),
            Err(MapError::InvalidParameter { .. })
        ));
        assert!(query(1440, MAX_HEIGHT + 1).dimensions().is_err());
        assert!(query(0, 720).dimensions().is_err());
    }

    #[test]
    fn test_error_status() {
        let response = error_response(&MapError::UnknownLayer("wind".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = error_response(&MapError::DataNotAvailable("co2".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
