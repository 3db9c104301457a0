// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for huaweidns-webhook
//!
//! - HTTP request metrics (count, duration, status codes)
//! - Challenge operation metrics (present, cleanup)
//! - Huawei Cloud DNS API call metrics

use lazy_static::lazy_static;
use prometheus::{
    opts, register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec,
    TextEncoder,
};

lazy_static! {
    /// HTTP request counter by method, path, and status code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        opts!(
            "huaweidns_http_requests_total",
            "Total number of HTTP requests processed"
        ),
        &["method", "path", "status"]
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration histogram
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "huaweidns_http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Challenge operations counter by operation and result
    pub static ref CHALLENGE_OPERATIONS_TOTAL: CounterVec = register_counter_vec!(
        opts!(
            "huaweidns_challenge_operations_total",
            "Total number of DNS-01 challenge operations"
        ),
        &["operation", "result"]
    )
    .expect("Failed to create CHALLENGE_OPERATIONS_TOTAL metric");

    /// Provider API request counter by operation and result
    pub static ref PROVIDER_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        opts!(
            "huaweidns_provider_requests_total",
            "Total number of Huawei Cloud DNS API requests"
        ),
        &["operation", "result"]
    )
    .expect("Failed to create PROVIDER_REQUESTS_TOTAL metric");

    /// Provider API request duration histogram
    pub static ref PROVIDER_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "huaweidns_provider_request_duration_seconds",
        "Huawei Cloud DNS API request duration in seconds",
        &["operation"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create PROVIDER_REQUEST_DURATION_SECONDS metric");

    /// Application info metric
    pub static ref APP_INFO: CounterVec = register_counter_vec!(
        opts!(
            "huaweidns_app_info",
            "Application information"
        ),
        &["version"]
    )
    .expect("Failed to create APP_INFO metric");
}

/// Initialize metrics with application info
pub fn init_metrics() {
    APP_INFO
        .with_label_values(&[env!("CARGO_PKG_VERSION")])
        .inc();
}

/// Generate metrics output in Prometheus format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record an HTTP request
pub fn record_http_request(method: &str, path: &str, status: u16, duration: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration);
}

/// Record a present/cleanup outcome
pub fn record_challenge_operation(operation: &str, success: bool) {
    let result = if success { "success" } else { "error" };
    CHALLENGE_OPERATIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}

/// Record a Huawei Cloud DNS API call
pub fn record_provider_request(operation: &str, success: bool, duration: f64) {
    let result = if success { "success" } else { "error" };
    PROVIDER_REQUESTS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
    PROVIDER_REQUEST_DURATION_SECONDS
        .with_label_values(&[operation])
        .observe(duration);
}
