// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Credential retrieval from Kubernetes Secrets

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use tracing::debug;

use crate::{config::SecretKeySelector, types::SolverError};

/// Fetches a single secret value by selector and namespace
#[async_trait]
pub trait SecretFetcher: Send + Sync {
    async fn fetch(
        &self,
        selector: &SecretKeySelector,
        namespace: &str,
    ) -> Result<Vec<u8>, SolverError>;
}

/// [`SecretFetcher`] backed by the Kubernetes API
#[derive(Clone)]
pub struct KubeSecretFetcher {
    client: Client,
}

impl KubeSecretFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretFetcher for KubeSecretFetcher {
    async fn fetch(
        &self,
        selector: &SecretKeySelector,
        namespace: &str,
    ) -> Result<Vec<u8>, SolverError> {
        let qualified = format!("{}/{}", namespace, selector.name);
        debug!("loading secret {}", qualified);

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = secrets
            .get_opt(&selector.name)
            .await
            .map_err(|e| SolverError::SecretNotFound(format!("{}: {}", qualified, e)))?
            .ok_or_else(|| SolverError::SecretNotFound(qualified.clone()))?;

        secret_value(&secret, &selector.key)
            .ok_or_else(|| SolverError::KeyNotFound(format!("no key {:?} in secret {:?}", selector.key, qualified)))
    }
}

/// Look up a key in a Secret's `data`, falling back to `stringData`
pub fn secret_value(secret: &Secret, key: &str) -> Option<Vec<u8>> {
    if let Some(value) = secret.data.as_ref().and_then(|data| data.get(key)) {
        return Some(value.0.clone());
    }
    secret
        .string_data
        .as_ref()
        .and_then(|data| data.get(key))
        .map(|value| value.as_bytes().to_vec())
}
