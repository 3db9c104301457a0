// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS-01 challenge solver
//!
//! [`Solver`] is the capability set a webhook backend provides. [`HuaweiSolver`]
//! implements it against Huawei Cloud DNS:
//!
//! - `present`: create a TXT record set carrying the challenge key
//! - `clean_up`: delete only the TXT record set whose first value is the
//!   challenge key, so concurrent challenges on one name stay intact
//!
//! The solver holds no provider state. Every call decodes its config, loads
//! credentials and builds a fresh provider client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    config::{load_config, ProviderConfig},
    huawei::{CreateRecordSet, Credentials, DnsApi, DnsConnector, RecordSet},
    metrics,
    pagination::list_all,
    secrets::{KubeSecretFetcher, SecretFetcher},
    types::SolverError,
    zone::{extract_record_name, resolve_zone_id, ZoneFinder},
};

/// Name this solver is referenced by on an Issuer
pub const SOLVER_NAME: &str = "huawei";

/// Record type managed by the solver
pub const TXT_RECORD_TYPE: &str = "TXT";

/// Challenge action requested by cert-manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub enum ChallengeAction {
    #[default]
    Present,
    CleanUp,
}

/// A single DNS-01 challenge as sent by cert-manager
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    /// Request UID, echoed in the response
    #[serde(default)]
    pub uid: String,

    /// Present or CleanUp
    #[serde(default)]
    pub action: ChallengeAction,

    /// Challenge type (always "dns-01")
    #[serde(rename = "type", default)]
    pub challenge_type: String,

    /// Domain the certificate is requested for
    #[serde(default)]
    pub dns_name: String,

    /// Expected TXT record value
    pub key: String,

    /// Namespace credential secrets are read from
    #[serde(default)]
    pub resource_namespace: String,

    /// FQDN the TXT record must exist at (e.g., "_acme-challenge.example.com.")
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String,

    /// Zone cert-manager believes is authoritative (e.g., "example.com.")
    pub resolved_zone: String,

    #[serde(default)]
    pub allow_ambient_credentials: bool,

    /// Solver configuration from the Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub config: Option<serde_json::Value>,
}

/// A DNS-01 solver backend
#[async_trait]
pub trait Solver: Send + Sync {
    /// Solver name; unique within a webhook deployment
    fn name(&self) -> &str;

    /// Establish access to the secrets store. Must succeed before present/clean_up.
    async fn initialize(&mut self, kube_config: kube::Config) -> Result<(), SolverError>;

    /// Create the TXT record for a challenge. Safe to call repeatedly.
    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), SolverError>;

    /// Remove the TXT record matching the challenge key. Absent records are not an error.
    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), SolverError>;
}

/// Huawei Cloud DNS solver
pub struct HuaweiSolver {
    secrets: Option<Arc<dyn SecretFetcher>>,
    zones: Arc<dyn ZoneFinder>,
    connector: Arc<dyn DnsConnector>,
}

impl HuaweiSolver {
    /// Create an uninitialized solver
    pub fn new(zones: Arc<dyn ZoneFinder>, connector: Arc<dyn DnsConnector>) -> Self {
        Self {
            secrets: None,
            zones,
            connector,
        }
    }

    /// Use an explicit secrets store instead of the Kubernetes API
    pub fn with_secret_fetcher(mut self, secrets: Arc<dyn SecretFetcher>) -> Self {
        self.secrets = Some(secrets);
        self
    }

    /// Load credentials and build a provider client for this challenge
    async fn client_for(
        &self,
        challenge: &ChallengeRequest,
        config: &ProviderConfig,
    ) -> Result<Arc<dyn DnsApi>, SolverError> {
        let secrets = self
            .secrets
            .as_ref()
            .ok_or_else(|| SolverError::NotInitialized("secrets store unavailable".to_string()))?;

        let access_key = secrets
            .fetch(&config.access_key_ref, &challenge.resource_namespace)
            .await?;
        let secret_key = secrets
            .fetch(&config.secret_key_ref, &challenge.resource_namespace)
            .await?;
        let credentials =
            Credentials::from_secret_bytes(&access_key, &secret_key, config.project_id.clone())?;

        self.connector.connect(credentials, &config.region_id)
    }

    async fn present_inner(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        let config = load_config(challenge.config.as_ref())?;
        let api = self.client_for(challenge, &config).await?;

        let zone_id = resolve_zone_id(
            api.as_ref(),
            self.zones.as_ref(),
            &challenge.resolved_fqdn,
            config.zone_type,
        )
        .await?;

        let request = CreateRecordSet {
            name: extract_record_name(&challenge.resolved_fqdn, &challenge.resolved_zone),
            record_type: TXT_RECORD_TYPE.to_string(),
            records: vec![challenge.key.clone()],
            ttl: config.ttl,
        };
        let created = api.create_record_set(&zone_id, &request).await?;

        info!(
            "Created {} record named '{}' to {:?} with ttl {} in Huawei Cloud DNS: record id={}",
            created.record_type,
            created.name,
            created.records,
            created
                .ttl
                .map(|t| t.to_string())
                .unwrap_or_else(|| "default".to_string()),
            created.id
        );
        Ok(())
    }

    async fn clean_up_inner(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        let config = load_config(challenge.config.as_ref())?;
        let api = self.client_for(challenge, &config).await?;

        let zone_id = resolve_zone_id(
            api.as_ref(),
            self.zones.as_ref(),
            &challenge.resolved_fqdn,
            config.zone_type,
        )
        .await?;

        let record_name = extract_record_name(&challenge.resolved_fqdn, &challenge.resolved_zone);
        let candidates = cleanup_candidates(api.as_ref(), &zone_id, &record_name).await?;

        for record_set in candidates {
            if record_set.records.first() != Some(&challenge.key) {
                debug!(
                    "skipping record set {} at '{}': value does not match challenge",
                    record_set.id, record_name
                );
                continue;
            }

            let deleted = api.delete_record_set(&zone_id, &record_set.id).await?;
            info!("Deleted record id {} in Huawei Cloud DNS", deleted);
        }

        Ok(())
    }
}

/// Non-default record sets at `record_name`, across all pages
pub async fn cleanup_candidates(
    api: &dyn DnsApi,
    zone_id: &str,
    record_name: &str,
) -> Result<Vec<RecordSet>, SolverError> {
    let record_sets = list_all(|page| api.list_record_sets(zone_id, record_name, page)).await?;
    Ok(record_sets
        .into_iter()
        .filter(|record_set| !record_set.default)
        .collect())
}

#[async_trait]
impl Solver for HuaweiSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn initialize(&mut self, kube_config: kube::Config) -> Result<(), SolverError> {
        let client = kube::Client::try_from(kube_config).map_err(|e| {
            SolverError::ClientBuild(format!("failed to create kubernetes client: {}", e))
        })?;
        self.secrets = Some(Arc::new(KubeSecretFetcher::new(client)));
        info!("{} solver initialized", SOLVER_NAME);
        Ok(())
    }

    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        let result = self.present_inner(challenge).await;
        metrics::record_challenge_operation("present", result.is_ok());
        result.map_err(|e| SolverError::Present(Box::new(e)))
    }

    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        let result = self.clean_up_inner(challenge).await;
        metrics::record_challenge_operation("cleanup", result.is_ok());
        result.map_err(|e| SolverError::CleanUp(Box::new(e)))
    }
}
