// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! huaweidns-webhook - cert-manager DNS-01 solver for Huawei Cloud DNS
//!
//! Answers ACME DNS-01 challenges by creating and deleting TXT record sets
//! in Huawei Cloud DNS on behalf of cert-manager.
//!
//! # Features
//!
//! - Authoritative zone discovery via SOA walk-up, matched against the account's zones
//! - Paginated zone and record-set enumeration
//! - Value-precise cleanup: concurrent challenges on one name (wildcard + apex) are safe
//! - AK/SK request signing (`SDK-HMAC-SHA256`)
//! - Credentials read from Kubernetes Secrets, never from the Issuer itself
//! - Prometheus metrics integration
//!
//! # Usage
//!
//! ## As a Binary
//!
//! ```bash
//! GROUP_NAME=acme.example.com huaweidns-webhook
//! ```
//!
//! ## Issuer Configuration
//!
//! ```yaml
//! solvers:
//!   - dns01:
//!       webhook:
//!         groupName: acme.example.com
//!         solverName: huawei
//!         config:
//!           regionId: ap-southeast-1
//!           accessKeyRef:
//!             name: huawei-credentials
//!             key: accessKey
//!           secretKeyRef:
//!             name: huawei-credentials
//!             key: secretKey
//! ```
//!
//! ## Record Name Extraction
//!
//! ```rust
//! use huaweidns_webhook::zone::extract_record_name;
//!
//! assert_eq!(
//!     extract_record_name("_acme-challenge.example.com.", "example.com."),
//!     "_acme-challenge"
//! );
//! ```

pub mod config;
pub mod huawei;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod secrets;
pub mod signer;
pub mod solver;
pub mod types;
pub mod webhook;
pub mod zone;

// Re-export commonly used types

// Solver
pub use solver::{ChallengeAction, ChallengeRequest, HuaweiSolver, Solver};

// Error types
pub use types::{AppState, ErrorResponse, SolverError};

// Configuration
pub use config::{ProviderConfig, SecretKeySelector, WebhookConfig, ZoneType};

// Provider client
pub use huawei::{DnsApi, DnsConnector, HuaweiConnector, HuaweiDnsClient, RecordSet, ZoneRecord};

// Webhook payloads
pub use webhook::{ChallengePayload, ChallengeResponse, ChallengeStatus};

#[cfg(test)]
mod middleware_test;
#[cfg(test)]
mod test_support;
#[cfg(test)]
mod types_test;
