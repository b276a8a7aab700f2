//! The browser map page.

use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET / - Leaflet map with layer toggles and weight sliders
pub async fn index_handler() -> impl IntoResponse {
    Html(INDEX_HTML)
}
