//! Layer API handlers.
//!
//! Both endpoints run a full render pass for the requested layers; the point
//! and centroid caches make repeat passes cheap.

use axum::{
    extract::{Extension, Query},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{error_response, MapQuery};
use crate::state::AppState;

/// GET /api/layers - Overlays, composite and status messages as JSON
#[instrument(skip(state))]
pub async fn layers_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Response {
    let request = match query.to_request() {
        Ok(r) => r,
        Err(e) => return error_response(&e),
    };

    match state.engine.render(&request).await {
        Ok(output) => {
            info!(
                pass_id = %output.pass_id,
                overlays = output.overlays.len(),
                composite = output.composite.is_some(),
                "Layers request"
            );
            Json(output).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET /api/map.png - One overlay rasterized over the whole globe
#[instrument(skip(state))]
pub async fn map_png_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<MapQuery>,
) -> Response {
    let parsed = query
        .to_request()
        .and_then(|request| Ok((request, query.overlay_id()?, query.dimensions()?)));
    let (request, overlay_id, (width, height)) = match parsed {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    let output = match state.engine.render(&request).await {
        Ok(output) => output,
        Err(e) => return error_response(&e),
    };

    match state.engine.render_png(&output, &overlay_id, width, height) {
        Ok(png) => {
            info!(overlay = %overlay_id, width, height, bytes = png.len(), "Rendered map PNG");
            (
                [
                    (header::CONTENT_TYPE, "image/png"),
                    (header::CACHE_CONTROL, "no-store"),
                ],
                png,
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}
