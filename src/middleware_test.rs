// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for middleware module

use super::middleware::*;
use crate::metrics::HTTP_REQUESTS_TOTAL;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower::ServiceExt;

async fn test_handler() -> impl IntoResponse {
    (StatusCode::OK, "success")
}

async fn test_handler_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "error")
}

fn request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_track_metrics_success() {
    let app = Router::new()
        .route("/mw-ok", get(test_handler))
        .route_layer(middleware::from_fn(track_metrics));

    let response = app.oneshot(request("/mw-ok")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let count = HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/mw-ok", "200"])
        .get();
    assert!(count >= 1.0);
}

#[tokio::test]
async fn test_track_metrics_error_response() {
    let app = Router::new()
        .route("/mw-error", get(test_handler_error))
        .route_layer(middleware::from_fn(track_metrics));

    let response = app.oneshot(request("/mw-error")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let count = HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/mw-error", "500"])
        .get();
    assert!(count >= 1.0);
}

#[tokio::test]
async fn test_track_metrics_uses_route_template() {
    let app = Router::new()
        .route("/mw-solvers/{solver}", get(test_handler))
        .route_layer(middleware::from_fn(track_metrics));

    let _ = app.clone().oneshot(request("/mw-solvers/huawei")).await.unwrap();
    let _ = app.oneshot(request("/mw-solvers/route53")).await.unwrap();

    let count = HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/mw-solvers/{solver}", "200"])
        .get();
    assert!(count >= 2.0);
}

#[tokio::test]
async fn test_track_metrics_unmatched_path() {
    let app = Router::new()
        .route("/mw-known", get(test_handler))
        .layer(middleware::from_fn(track_metrics));

    let response = app.oneshot(request("/mw-unknown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let count = HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "unmatched", "404"])
        .get();
    assert!(count >= 1.0);
}
