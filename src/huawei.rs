// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Huawei Cloud DNS v2 API client
//!
//! Only the four operations the solver needs are implemented:
//! - List zones (`GET /v2/zones`)
//! - List record sets in a zone (`GET /v2.1/zones/{zone_id}/recordsets`)
//! - Create a record set (`POST /v2.1/zones/{zone_id}/recordsets`)
//! - Delete a record set (`DELETE /v2/zones/{zone_id}/recordsets/{recordset_id}`)
//!
//! Requests are signed with [`crate::signer`]. The [`DnsApi`] trait is the seam
//! the solver talks to, so alternative backends and test doubles can stand in
//! for the HTTP client.

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::{
    config::{ZoneType, DEFAULT_HTTP_TIMEOUT_SECS},
    metrics,
    pagination::{Page, PageRequest},
    signer::{self, SigningRequest, HEADER_SDK_DATE},
    types::SolverError,
};

/// Header carrying the project id
const HEADER_PROJECT_ID: &str = "X-Project-Id";

/// Provider zone entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ZoneRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Provider record set entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecordSet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub records: Vec<String>,
    /// Provider-managed record (SOA/NS at the apex); never modified
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

/// Body of a create-record-set call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub records: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ListMetadata {
    #[serde(default)]
    total_count: u32,
}

#[derive(Debug, Deserialize)]
struct ListZonesResponse {
    #[serde(default)]
    zones: Vec<ZoneRecord>,
    #[serde(default)]
    metadata: ListMetadata,
}

#[derive(Debug, Deserialize)]
struct ListRecordSetsResponse {
    #[serde(default)]
    recordsets: Vec<RecordSet>,
    #[serde(default)]
    metadata: ListMetadata,
}

#[derive(Debug, Deserialize)]
struct DeleteRecordSetResponse {
    #[serde(default)]
    id: String,
}

/// Error body returned by the API gateway
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "code")]
    error_code: Option<String>,
    #[serde(alias = "message")]
    error_msg: Option<String>,
}

/// Record-management operations exposed by a DNS provider
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// List one page of zones
    async fn list_zones(
        &self,
        zone_type: ZoneType,
        page: PageRequest,
    ) -> Result<Page<ZoneRecord>, SolverError>;

    /// List one page of record sets in a zone, filtered by name
    async fn list_record_sets(
        &self,
        zone_id: &str,
        name: &str,
        page: PageRequest,
    ) -> Result<Page<RecordSet>, SolverError>;

    /// Create a record set, returning the created entity
    async fn create_record_set(
        &self,
        zone_id: &str,
        request: &CreateRecordSet,
    ) -> Result<RecordSet, SolverError>;

    /// Delete a record set, returning the deleted record set id
    async fn delete_record_set(
        &self,
        zone_id: &str,
        record_set_id: &str,
    ) -> Result<String, SolverError>;
}

/// AK/SK credential pair
#[derive(Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
    pub project_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl Credentials {
    /// Build credentials from raw secret bytes
    pub fn from_secret_bytes(
        access_key: &[u8],
        secret_key: &[u8],
        project_id: Option<String>,
    ) -> Result<Self, SolverError> {
        let access_key = std::str::from_utf8(access_key)
            .map_err(|e| SolverError::CredentialBuild(format!("access key is not UTF-8: {}", e)))?
            .trim()
            .to_string();
        let secret_key = std::str::from_utf8(secret_key)
            .map_err(|e| SolverError::CredentialBuild(format!("secret key is not UTF-8: {}", e)))?
            .trim()
            .to_string();

        if access_key.is_empty() {
            return Err(SolverError::CredentialBuild(
                "access key cannot be empty".to_string(),
            ));
        }
        if secret_key.is_empty() {
            return Err(SolverError::CredentialBuild(
                "secret key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            access_key,
            secret_key,
            project_id: project_id.filter(|p| !p.trim().is_empty()),
        })
    }
}

/// Builds a provider client from credentials and a region
pub trait DnsConnector: Send + Sync {
    fn connect(
        &self,
        credentials: Credentials,
        region_id: &str,
    ) -> Result<Arc<dyn DnsApi>, SolverError>;
}

/// Connector producing [`HuaweiDnsClient`]s
#[derive(Debug, Clone)]
pub struct HuaweiConnector {
    /// Fixed endpoint overriding the regional template
    endpoint: Option<String>,
    timeout: Duration,
}

impl Default for HuaweiConnector {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl HuaweiConnector {
    /// Create a connector
    ///
    /// # Arguments
    /// * `endpoint` - Optional endpoint override (default: `https://dns.{region}.myhuaweicloud.com`)
    /// * `timeout` - Per-request HTTP timeout
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Self {
        Self { endpoint, timeout }
    }
}

impl DnsConnector for HuaweiConnector {
    fn connect(
        &self,
        credentials: Credentials,
        region_id: &str,
    ) -> Result<Arc<dyn DnsApi>, SolverError> {
        let endpoint = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => regional_endpoint(region_id)?,
        };
        let client = HuaweiDnsClient::new(&endpoint, credentials, self.timeout)?;
        Ok(Arc::new(client))
    }
}

/// Regional DNS endpoint for a region id
pub fn regional_endpoint(region_id: &str) -> Result<String, SolverError> {
    let region_id = region_id.trim();
    if region_id.is_empty() {
        return Err(SolverError::ClientBuild("regionId cannot be empty".to_string()));
    }
    if !region_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(SolverError::ClientBuild(format!(
            "invalid regionId: {}",
            region_id
        )));
    }
    Ok(format!("https://dns.{}.myhuaweicloud.com", region_id))
}

/// Signed HTTP client for the Huawei Cloud DNS API
pub struct HuaweiDnsClient {
    http: Client,
    endpoint: Url,
    host: String,
    credentials: Credentials,
}

impl HuaweiDnsClient {
    /// Create a new client for the given endpoint
    pub fn new(
        endpoint: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, SolverError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SolverError::ClientBuild(format!("invalid endpoint {}: {}", endpoint, e)))?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(SolverError::ClientBuild(format!(
                    "endpoint has no host: {}",
                    endpoint
                )))
            }
        };

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SolverError::ClientBuild(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            host,
            credentials,
        })
    }

    /// Send a signed request and decode the JSON response
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> Result<T, SolverError> {
        let start = Instant::now();
        let result = self.send_inner(operation, method, path, query, body).await;
        metrics::record_provider_request(
            operation,
            result.is_ok(),
            start.elapsed().as_secs_f64(),
        );
        result
    }

    async fn send_inner<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> Result<T, SolverError> {
        let mut url = self
            .endpoint
            .join(path)
            .map_err(|e| SolverError::provider(operation, format!("invalid path {}: {}", path, e)))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        let payload = body.unwrap_or_default();
        let mut headers = vec![
            ("Host".to_string(), self.host.clone()),
            (
                HEADER_SDK_DATE.to_string(),
                signer::sdk_date(chrono::Utc::now()),
            ),
        ];
        if !payload.is_empty() {
            headers.push((
                "Content-Type".to_string(),
                "application/json;charset=UTF-8".to_string(),
            ));
        }
        if let Some(project_id) = &self.credentials.project_id {
            headers.push((HEADER_PROJECT_ID.to_string(), project_id.clone()));
        }

        let authorization = signer::sign(
            &SigningRequest {
                method: method.as_str(),
                path: url.path(),
                query: &query,
                headers: &headers,
                body: &payload,
            },
            &self.credentials.access_key,
            &self.credentials.secret_key,
        )?;

        debug!("Huawei DNS API request: {} {}", method, url.path());

        let mut request = self.http.request(method, url);
        for (key, value) in &headers {
            // reqwest derives Host from the URL
            if key != "Host" {
                request = request.header(key.as_str(), value.as_str());
            }
        }
        request = request.header("Authorization", authorization);
        if !payload.is_empty() {
            request = request.body(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SolverError::provider(operation, format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SolverError::provider(operation, format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = describe_api_error(status.as_u16(), &text);
            error!("Huawei DNS API {} failed: {}", operation, message);
            return Err(SolverError::provider(operation, message));
        }

        serde_json::from_str(&text)
            .map_err(|e| SolverError::provider(operation, format!("failed to parse response: {}", e)))
    }
}

/// Render a non-2xx response as a readable message
fn describe_api_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            error_code: Some(code),
            error_msg: Some(msg),
        }) => format!("HTTP {}: [{}] {}", status, code, msg),
        Ok(ApiErrorBody {
            error_msg: Some(msg),
            ..
        }) => format!("HTTP {}: {}", status, msg),
        _ => format!("HTTP {}: {}", status, body.trim()),
    }
}

fn page_query(page: PageRequest) -> Vec<(String, String)> {
    vec![
        ("offset".to_string(), page.offset.to_string()),
        ("limit".to_string(), page.limit.to_string()),
    ]
}

#[async_trait]
impl DnsApi for HuaweiDnsClient {
    async fn list_zones(
        &self,
        zone_type: ZoneType,
        page: PageRequest,
    ) -> Result<Page<ZoneRecord>, SolverError> {
        let mut query = vec![("type".to_string(), zone_type.as_str().to_string())];
        query.extend(page_query(page));

        let response: ListZonesResponse = self
            .send("list zones", Method::GET, "/v2/zones", query, None)
            .await?;

        Ok(Page {
            items: response.zones,
            total_count: response.metadata.total_count,
        })
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        name: &str,
        page: PageRequest,
    ) -> Result<Page<RecordSet>, SolverError> {
        let mut query = vec![("name".to_string(), name.to_string())];
        query.extend(page_query(page));

        let response: ListRecordSetsResponse = self
            .send(
                "list record sets",
                Method::GET,
                &format!("/v2.1/zones/{}/recordsets", zone_id),
                query,
                None,
            )
            .await?;

        Ok(Page {
            items: response.recordsets,
            total_count: response.metadata.total_count,
        })
    }

    async fn create_record_set(
        &self,
        zone_id: &str,
        request: &CreateRecordSet,
    ) -> Result<RecordSet, SolverError> {
        let body = serde_json::to_vec(request)
            .map_err(|e| SolverError::provider("create record set", e.to_string()))?;

        self.send(
            "create record set",
            Method::POST,
            &format!("/v2.1/zones/{}/recordsets", zone_id),
            Vec::new(),
            Some(body),
        )
        .await
    }

    async fn delete_record_set(
        &self,
        zone_id: &str,
        record_set_id: &str,
    ) -> Result<String, SolverError> {
        let response: DeleteRecordSetResponse = self
            .send(
                "delete record set",
                Method::DELETE,
                &format!("/v2/zones/{}/recordsets/{}", zone_id, record_set_id),
                Vec::new(),
                None,
            )
            .await?;

        Ok(response.id)
    }
}
