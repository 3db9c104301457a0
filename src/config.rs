// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Webhook configuration
//!
//! Two layers of configuration exist:
//! - [`WebhookConfig`]: process-wide settings read once from the environment at startup
//! - [`ProviderConfig`]: per-challenge solver settings decoded from the issuer's
//!   `webhook.config` block on every invocation

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use utoipa::ToSchema;

use crate::types::SolverError;

/// Default HTTP port for the webhook server
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default Huawei Cloud DNS request timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Reference to a single key inside a Kubernetes Secret
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct SecretKeySelector {
    /// Secret name
    #[serde(default)]
    pub name: String,

    /// Key within the secret's data
    #[serde(default)]
    pub key: String,
}

/// Which family of hosted zones to search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    #[default]
    Private,
    Public,
}

impl ZoneType {
    /// Value of the `type` query parameter on the zone listing API
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::Private => "private",
            ZoneType::Public => "public",
        }
    }
}

/// Solver configuration supplied by the issuer
///
/// Credentials are never inlined: both keys are references into a Secret in the
/// challenge's resource namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Secret reference holding the access key (AK)
    #[serde(default)]
    pub access_key_ref: SecretKeySelector,

    /// Secret reference holding the secret key (SK)
    #[serde(default)]
    pub secret_key_ref: SecretKeySelector,

    /// Region identifier (e.g., "ap-southeast-1")
    #[serde(default)]
    pub region_id: String,

    /// Project id sent with every request; required by some regional endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Zone family to search (default: private)
    #[serde(default)]
    pub zone_type: ZoneType,

    /// TTL for created TXT records (provider default when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Decode the solver configuration attached to a challenge.
///
/// A missing configuration yields the default (empty) config.
pub fn load_config(raw: Option<&serde_json::Value>) -> Result<ProviderConfig, SolverError> {
    match raw {
        None | Some(serde_json::Value::Null) => Ok(ProviderConfig::default()),
        Some(value) => ProviderConfig::deserialize(value)
            .map_err(|e| SolverError::ConfigDecode(e.to_string())),
    }
}

/// Process-wide webhook configuration
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// API group the webhook serves (e.g., "acme.example.com")
    pub group_name: String,
    /// HTTP listen port
    pub api_port: u16,
    /// Recursive nameservers used for SOA lookups (system configuration when empty)
    pub recursive_nameservers: Vec<SocketAddr>,
    /// Override for the regional Huawei Cloud DNS endpoint
    pub dns_endpoint: Option<String>,
    /// Provider HTTP request timeout in seconds
    pub http_timeout_secs: u64,
}

impl WebhookConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `GROUP_NAME`: API group name (required)
    /// - `API_PORT`: Listen port (default: 8080)
    /// - `RECURSIVE_NAMESERVERS`: Comma-separated `ip` or `ip:port` list
    /// - `HUAWEI_DNS_ENDPOINT`: Endpoint override (e.g., "https://dns.example.internal")
    /// - `HTTP_TIMEOUT_SECS`: Provider request timeout (default: 30)
    pub fn from_env() -> Result<Self, String> {
        let group_name = std::env::var("GROUP_NAME").unwrap_or_default();

        let api_port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_API_PORT);

        let recursive_nameservers = match std::env::var("RECURSIVE_NAMESERVERS") {
            Ok(value) => parse_nameservers(&value)?,
            Err(_) => Vec::new(),
        };

        let dns_endpoint = std::env::var("HUAWEI_DNS_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let http_timeout_secs = std::env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        let config = Self {
            group_name,
            api_port,
            recursive_nameservers,
            dns_endpoint,
            http_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.group_name.trim().is_empty() {
            return Err("GROUP_NAME must be specified".to_string());
        }

        if self.api_port == 0 {
            return Err("api_port must be greater than 0".to_string());
        }

        if self.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Parse a comma-separated nameserver list; bare IPs get port 53
pub fn parse_nameservers(value: &str) -> Result<Vec<SocketAddr>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<SocketAddr>()
                .or_else(|_| s.parse::<IpAddr>().map(|ip| SocketAddr::new(ip, 53)))
                .map_err(|_| format!("invalid nameserver address: {}", s))
        })
        .collect()
}
