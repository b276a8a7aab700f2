//! HTTP routes exercised through the router without binding a socket.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::harness;
use map_api::{build_router, AppState, MapConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> (Router, TempDir) {
    let h = harness().build();
    let state = Arc::new(AppState::with_engine(h.engine, MapConfig::default()));
    let handle = PrometheusBuilder::new().build_recorder().handle();
    (build_router(state, handle), h.dir)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = app();
    let (status, _, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_index_page() {
    let (app, _dir) = app();
    let (status, content_type, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("leaflet-heat.js"));
    assert!(html.contains("/api/layers"));
}

#[tokio::test]
async fn test_layers_json() {
    let (app, _dir) = app();
    let (status, _, body) = get(app, "/api/layers?layers=solar,co2&solar_weight=0.6").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    let overlays = json["overlays"].as_array().unwrap();
    assert_eq!(overlays.len(), 2);
    assert_eq!(overlays[0]["id"], "solar");
    assert_eq!(overlays[0]["points"].as_array().unwrap().len(), 9);
    assert_eq!(overlays[0]["points"][0].as_array().unwrap().len(), 3);
    assert!(overlays[1]["options"]["gradient"].is_object());

    assert_eq!(json["composite"]["id"], "composite");
    let co2_weight = json["composite"]["weights"]["co2"].as_f64().unwrap();
    assert!((co2_weight - 0.4).abs() < 1e-9);
    assert!(json["status"].as_array().unwrap().len() >= 2);
    assert!(json["pass_id"].is_string());
}

#[tokio::test]
async fn test_unknown_layer_is_bad_request() {
    let (app, _dir) = app();
    let (status, _, body) = get(app, "/api/layers?layers=solar,wind").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "Unknown layer: wind");
}

#[tokio::test]
async fn test_map_png() {
    let (app, _dir) = app();
    let (status, content_type, body) =
        get(app, "/api/map.png?layers=solar&overlay=solar&width=64&height=32").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(&body[1..4], b"PNG");
}

#[tokio::test]
async fn test_map_png_for_missing_overlay() {
    let (app, _dir) = app();
    let (status, _, _) = get(app, "/api/map.png?layers=solar&overlay=co2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_map_png_rejects_oversized_image() {
    let (app, _dir) = app();
    let (status, _, body) = get(app, "/api/map.png?layers=solar&width=8192&height=8192").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("'width'"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _dir) = app();
    let (status, content_type, _) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
}
