// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! cert-manager webhook API handlers
//!
//! cert-manager reaches external DNS-01 solvers through the Kubernetes
//! aggregated API. This module serves that API:
//! - `POST /apis/{group}/v1alpha1/{solver}`: run a Present or CleanUp
//! - `GET /apis/{group}/v1alpha1`: resource discovery for the API group
//!
//! Challenge failures are reported in the response payload
//! (`success: false`), not as HTTP errors, so cert-manager can surface the
//! message and retry on its own schedule.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{APIResource, APIResourceList};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::{
    solver::{ChallengeAction, ChallengeRequest},
    types::{AppState, SolverError},
};

/// API version served for the challenge resource
pub const API_VERSION: &str = "v1alpha1";

/// `apiVersion` of challenge payloads
pub const PAYLOAD_API_VERSION: &str = "acme.cert-manager.io/v1alpha1";

/// `kind` of challenge payloads
pub const PAYLOAD_KIND: &str = "ChallengePayload";

/// Outcome detail attached to a failed challenge
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatus {
    /// "Success" or "Failure"
    pub status: String,

    /// Human-readable error message
    pub message: String,

    /// Machine-readable reason (e.g., "InternalError")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// HTTP-style status code
    pub code: u16,
}

/// Result of a challenge operation
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// UID of the request being answered
    pub uid: String,

    /// Whether the operation succeeded
    pub success: bool,

    /// Failure detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ChallengeStatus>,
}

/// Envelope exchanged with cert-manager
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengePayload {
    /// "acme.cert-manager.io/v1alpha1"
    #[serde(default)]
    pub api_version: String,

    /// "ChallengePayload"
    #[serde(default)]
    pub kind: String,

    /// Challenge to solve (set on requests)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,

    /// Outcome (set on responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

impl ChallengeResponse {
    /// Build the response for a finished operation
    pub fn from_result(uid: &str, result: Result<(), SolverError>) -> Self {
        match result {
            Ok(()) => Self {
                uid: uid.to_string(),
                success: true,
                status: None,
            },
            Err(e) => Self {
                uid: uid.to_string(),
                success: false,
                status: Some(ChallengeStatus {
                    status: "Failure".to_string(),
                    message: e.to_string(),
                    reason: Some("InternalError".to_string()),
                    code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                }),
            },
        }
    }
}

/// Build the webhook API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/apis/{group}/{version}", get(discovery))
        .route("/apis/{group}/{version}/{solver}", post(solve_challenge))
        .with_state(state)
}

fn check_group_version(state: &AppState, group: &str, version: &str) -> Result<(), SolverError> {
    if group != state.group_name || version != API_VERSION {
        return Err(SolverError::UnknownSolver(format!(
            "no API served at {}/{}",
            group, version
        )));
    }
    Ok(())
}

/// Discover the resources served by this webhook
#[utoipa::path(
    get,
    path = "/apis/{group}/{version}",
    params(
        ("group" = String, Path, description = "API group name"),
        ("version" = String, Path, description = "API version (v1alpha1)")
    ),
    responses(
        (status = 200, description = "Resource list"),
        (status = 404, description = "Group or version not served"),
    ),
    tag = "discovery"
)]
pub async fn discovery(
    State(state): State<AppState>,
    Path((group, version)): Path<(String, String)>,
) -> Result<Json<APIResourceList>, SolverError> {
    check_group_version(&state, &group, &version)?;

    let solver_name = state.solver.name().to_string();
    Ok(Json(APIResourceList {
        group_version: format!("{}/{}", group, version),
        resources: vec![APIResource {
            name: solver_name.clone(),
            singular_name: solver_name,
            namespaced: false,
            kind: PAYLOAD_KIND.to_string(),
            verbs: vec!["create".to_string()],
            ..Default::default()
        }],
    }))
}

/// Present or clean up a DNS-01 challenge
#[utoipa::path(
    post,
    path = "/apis/{group}/{version}/{solver}",
    request_body = ChallengePayload,
    params(
        ("group" = String, Path, description = "API group name"),
        ("version" = String, Path, description = "API version (v1alpha1)"),
        ("solver" = String, Path, description = "Solver name")
    ),
    responses(
        (status = 201, description = "Challenge processed; see response.success", body = ChallengePayload),
        (status = 400, description = "Payload carries no request"),
        (status = 404, description = "Unknown group, version, or solver"),
    ),
    tag = "challenges"
)]
pub async fn solve_challenge(
    State(state): State<AppState>,
    Path((group, version, solver)): Path<(String, String, String)>,
    Json(payload): Json<ChallengePayload>,
) -> Result<(StatusCode, Json<ChallengePayload>), SolverError> {
    check_group_version(&state, &group, &version)?;
    if solver != state.solver.name() {
        return Err(SolverError::UnknownSolver(solver));
    }

    let request = payload
        .request
        .ok_or_else(|| SolverError::InvalidRequest("payload has no request".to_string()))?;

    info!(
        "{:?} challenge {} for {} (fqdn {}, zone {})",
        request.action, request.uid, request.dns_name, request.resolved_fqdn, request.resolved_zone
    );

    let result = match request.action {
        ChallengeAction::Present => state.solver.present(&request).await,
        ChallengeAction::CleanUp => state.solver.clean_up(&request).await,
    };
    if let Err(e) = &result {
        error!("challenge {} failed: {}", request.uid, e);
    }

    let api_version = if payload.api_version.is_empty() {
        PAYLOAD_API_VERSION.to_string()
    } else {
        payload.api_version
    };

    Ok((
        StatusCode::CREATED,
        Json(ChallengePayload {
            api_version,
            kind: PAYLOAD_KIND.to_string(),
            request: None,
            response: Some(ChallengeResponse::from_result(&request.uid, result)),
        }),
    ))
}
