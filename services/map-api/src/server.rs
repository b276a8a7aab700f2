//! Router assembly and the serve loop.

use anyhow::Result;
use axum::{extract::Extension, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>, prometheus_handle: PrometheusHandle) -> Router {
    Router::new()
        // Browser UI
        .route("/", get(handlers::index_handler))
        // Layer API
        .route("/api/layers", get(handlers::layers_handler))
        .route("/api/map.png", get(handlers::map_png_handler))
        // Health check
        .route("/health", get(handlers::health_handler))
        // Metrics
        .route("/metrics", get(handlers::metrics_handler))
        // Layer extensions
        .layer(Extension(state))
        .layer(Extension(prometheus_handle))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until the process is stopped.
pub async fn serve(app: Router, listen: &str) -> Result<()> {
    let addr: SocketAddr = listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
