// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for types module

use super::types::*;
use crate::test_support::StubSolver;
use axum::body::to_bytes;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

#[test]
fn test_app_state_clone() {
    let state = AppState {
        solver: Arc::new(StubSolver::default()),
        group_name: "acme.example.com".to_string(),
    };

    let cloned = state.clone();
    assert_eq!(cloned.group_name, "acme.example.com");
    assert!(Arc::ptr_eq(&cloned.solver, &state.solver));
}

#[test]
fn test_error_response_serialization() {
    let response = ErrorResponse {
        error: "Test error".to_string(),
        details: Some("Details here".to_string()),
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("Test error"));
    assert!(json.contains("Details here"));
}

#[test]
fn test_error_response_without_details() {
    let response = ErrorResponse {
        error: "Test error".to_string(),
        details: None,
    };

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("null")); // None is serialized as null
}

#[test]
fn test_solver_error_messages() {
    let cases = vec![
        (
            SolverError::ConfigDecode("missing field".to_string()),
            "error decoding solver config: missing field",
        ),
        (
            SolverError::SecretNotFound("cert-manager/huawei".to_string()),
            "failed to load secret: cert-manager/huawei",
        ),
        (
            SolverError::KeyNotFound("accessKey".to_string()),
            "key not found: accessKey",
        ),
        (
            SolverError::ZoneNotFound("example.com".to_string()),
            "zone not found: example.com",
        ),
        (
            SolverError::provider("list zones", "HTTP 401: denied"),
            "list zones failed: HTTP 401: denied",
        ),
        (
            SolverError::DnsResolution("timeout".to_string()),
            "failed to find zone by fqdn: timeout",
        ),
        (
            SolverError::UnknownSolver("route53".to_string()),
            "Unknown solver: route53",
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(error.to_string(), expected);
    }
}

#[test]
fn test_wrapped_error_message_keeps_cause() {
    let error = SolverError::CleanUp(Box::new(SolverError::provider(
        "delete record set",
        "HTTP 500: boom",
    )));
    assert_eq!(
        error.to_string(),
        "cleanup failed: delete record set failed: HTTP 500: boom"
    );
}

#[test]
fn test_root_cause_unwraps_nested() {
    let error = SolverError::Present(Box::new(SolverError::ZoneNotFound(
        "example.com".to_string(),
    )));
    assert!(matches!(error.root_cause(), SolverError::ZoneNotFound(_)));

    let plain = SolverError::InvalidRequest("x".to_string());
    assert!(matches!(plain.root_cause(), SolverError::InvalidRequest(_)));
}

#[test]
fn test_status_codes() {
    let cases = vec![
        (SolverError::ConfigDecode(String::new()), StatusCode::BAD_REQUEST),
        (SolverError::InvalidRequest(String::new()), StatusCode::BAD_REQUEST),
        (SolverError::SecretNotFound(String::new()), StatusCode::NOT_FOUND),
        (SolverError::KeyNotFound(String::new()), StatusCode::NOT_FOUND),
        (SolverError::ZoneNotFound(String::new()), StatusCode::NOT_FOUND),
        (SolverError::UnknownSolver(String::new()), StatusCode::NOT_FOUND),
        (
            SolverError::CredentialBuild(String::new()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            SolverError::ClientBuild(String::new()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            SolverError::NotInitialized(String::new()),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (SolverError::provider("list zones", ""), StatusCode::BAD_GATEWAY),
        (SolverError::DnsResolution(String::new()), StatusCode::BAD_GATEWAY),
    ];

    for (error, expected) in cases {
        assert_eq!(error.into_response().status(), expected);
    }
}

#[test]
fn test_wrapped_status_follows_root_cause() {
    let error = SolverError::Present(Box::new(SolverError::KeyNotFound("k".to_string())));
    assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_response_body() {
    let response = SolverError::UnknownSolver("route53".to_string()).into_response();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "Unknown solver: route53");
    assert!(json["details"].is_null());
}
