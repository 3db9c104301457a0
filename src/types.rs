// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common types and errors used throughout the huaweidns-webhook library

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::solver::Solver;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Challenge solver backing the webhook endpoint
    pub solver: Arc<dyn Solver>,
    /// API group the webhook is registered under (e.g. "acme.example.com")
    pub group_name: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

/// Solver error type
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("error decoding solver config: {0}")]
    ConfigDecode(String),

    #[error("failed to load secret: {0}")]
    SecretNotFound(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("failed to build credentials: {0}")]
    CredentialBuild(String),

    #[error("failed to build client: {0}")]
    ClientBuild(String),

    #[error("solver not initialized: {0}")]
    NotInitialized(String),

    #[error("zone not found: {0}")]
    ZoneNotFound(String),

    #[error("{operation} failed: {message}")]
    Provider {
        operation: &'static str,
        message: String,
    },

    #[error("failed to find zone by fqdn: {0}")]
    DnsResolution(String),

    #[error("present failed: {0}")]
    Present(Box<SolverError>),

    #[error("cleanup failed: {0}")]
    CleanUp(Box<SolverError>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown solver: {0}")]
    UnknownSolver(String),
}

impl SolverError {
    /// Build a provider error for the named API operation
    pub fn provider(operation: &'static str, message: impl Into<String>) -> Self {
        SolverError::Provider {
            operation,
            message: message.into(),
        }
    }

    /// Innermost error, unwrapping Present/CleanUp wrappers
    pub fn root_cause(&self) -> &SolverError {
        match self {
            SolverError::Present(inner) | SolverError::CleanUp(inner) => inner.root_cause(),
            other => other,
        }
    }
}

impl IntoResponse for SolverError {
    fn into_response(self) -> Response {
        let status = match self.root_cause() {
            SolverError::ConfigDecode(_) => StatusCode::BAD_REQUEST,
            SolverError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SolverError::SecretNotFound(_) => StatusCode::NOT_FOUND,
            SolverError::KeyNotFound(_) => StatusCode::NOT_FOUND,
            SolverError::ZoneNotFound(_) => StatusCode::NOT_FOUND,
            SolverError::UnknownSolver(_) => StatusCode::NOT_FOUND,
            SolverError::CredentialBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SolverError::ClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SolverError::NotInitialized(_) => StatusCode::SERVICE_UNAVAILABLE,
            SolverError::Provider { .. } => StatusCode::BAD_GATEWAY,
            SolverError::DnsResolution(_) => StatusCode::BAD_GATEWAY,
            SolverError::Present(_) | SolverError::CleanUp(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            details: None,
        });

        (status, body).into_response()
    }
}
