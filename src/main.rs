// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Huawei Cloud DNS webhook server for cert-manager
//!
//! Serves the cert-manager external webhook API under `GROUP_NAME`:
//! - Presents ACME DNS-01 TXT records in Huawei Cloud DNS
//! - Cleans up only the record belonging to each challenge
//! - Reads provider credentials from Kubernetes Secrets
//!
//! TLS for the aggregated API is expected to be terminated in front of this
//! process (APIService proxy or service mesh).

use anyhow::Context;
use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Import from the library
use huaweidns_webhook::{
    config::WebhookConfig,
    huawei::HuaweiConnector,
    metrics, middleware,
    solver::{HuaweiSolver, Solver},
    types::{AppState, ErrorResponse},
    webhook,
    zone::HickoryZoneFinder,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        webhook::solve_challenge,
        webhook::discovery,
    ),
    components(
        schemas(
            webhook::ChallengePayload,
            webhook::ChallengeResponse,
            webhook::ChallengeStatus,
            huaweidns_webhook::solver::ChallengeRequest,
            huaweidns_webhook::solver::ChallengeAction,
            huaweidns_webhook::config::ProviderConfig,
            huaweidns_webhook::config::SecretKeySelector,
            huaweidns_webhook::config::ZoneType,
        )
    ),
    tags(
        (name = "challenges", description = "DNS-01 challenge endpoints"),
        (name = "discovery", description = "API discovery endpoints")
    ),
    info(
        title = "Huawei Cloud DNS Webhook API",
        version = "0.1.0",
        description = "cert-manager ACME DNS-01 webhook solver for Huawei Cloud DNS",
        license(name = "MIT")
    )
)]
struct ApiDoc;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Metrics endpoint for Prometheus scraping
async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(metrics_text) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics_text,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to gather metrics: {}", e),
                details: None,
            }),
        )
            .into_response(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    info!(
        "starting huawei cloud dns webhook v{}",
        env!("CARGO_PKG_VERSION")
    );

    // initialize metrics
    metrics::init_metrics();

    // get configuration from environment
    let config = WebhookConfig::from_env().map_err(|e| {
        error!("invalid configuration: {}", e);
        anyhow::anyhow!(e)
    })?;

    info!("group name: {}", config.group_name);
    info!("api port: {}", config.api_port);
    if config.recursive_nameservers.is_empty() {
        info!("recursive nameservers: system configuration");
    } else {
        info!("recursive nameservers: {:?}", config.recursive_nameservers);
    }
    if let Some(endpoint) = &config.dns_endpoint {
        info!("huawei dns endpoint override: {}", endpoint);
    }

    // build solver
    let zone_finder = HickoryZoneFinder::new(&config.recursive_nameservers)
        .context("failed to create dns resolver")?;
    let connector = HuaweiConnector::new(
        config.dns_endpoint.clone(),
        Duration::from_secs(config.http_timeout_secs),
    );
    let mut solver = HuaweiSolver::new(Arc::new(zone_finder), Arc::new(connector));

    let kube_config = kube::Config::infer()
        .await
        .context("failed to load kubernetes configuration")?;
    solver
        .initialize(kube_config)
        .await
        .context("failed to initialize solver")?;

    info!("registered solver: {}", solver.name());

    // create application state
    let state = AppState {
        solver: Arc::new(solver),
        group_name: config.group_name.clone(),
    };

    // build main router
    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(webhook::router(state))
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route_layer(axum_middleware::from_fn(middleware::track_metrics))
        .layer(TraceLayer::new_for_http());

    // start server
    let addr = format!("0.0.0.0:{}", config.api_port);

    info!("huawei cloud dns webhook listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;

    Ok(())
}
