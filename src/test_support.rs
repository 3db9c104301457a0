// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory doubles shared by the unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{
    config::{SecretKeySelector, ZoneType},
    huawei::{CreateRecordSet, Credentials, DnsApi, DnsConnector, RecordSet, ZoneRecord},
    pagination::{Page, PageRequest},
    secrets::SecretFetcher,
    solver::{ChallengeAction, ChallengeRequest, HuaweiSolver, Solver, SOLVER_NAME},
    types::SolverError,
    zone::ZoneFinder,
};

pub const NAMESPACE: &str = "cert-manager";
pub const SECRET_NAME: &str = "huawei-credentials";
pub const REGION: &str = "ap-southeast-1";

/// Provider double recording every call
pub struct FakeDnsApi {
    pub zones: Vec<ZoneRecord>,
    pub record_sets: Vec<RecordSet>,
    /// Maximum items returned per page, independent of the requested limit
    pub page_size: usize,
    /// Operation name that fails ("list zones", "delete record set", ...)
    pub fail_on: Option<&'static str>,
    pub zone_pages: Mutex<Vec<PageRequest>>,
    pub record_pages: Mutex<Vec<(String, String, PageRequest)>>,
    pub created: Mutex<Vec<(String, CreateRecordSet)>>,
    pub deleted: Mutex<Vec<(String, String)>>,
}

impl Default for FakeDnsApi {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            record_sets: Vec::new(),
            page_size: usize::MAX,
            fail_on: None,
            zone_pages: Mutex::new(Vec::new()),
            record_pages: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }
}

impl FakeDnsApi {
    pub fn with_zones(zones: &[(&str, &str)]) -> Self {
        Self {
            zones: zones.iter().map(|(id, name)| zone(id, name)).collect(),
            ..Default::default()
        }
    }

    fn check(&self, operation: &'static str) -> Result<(), SolverError> {
        if self.fail_on == Some(operation) {
            return Err(SolverError::provider(operation, "HTTP 500: injected failure"));
        }
        Ok(())
    }

    fn page_of<T: Clone>(&self, items: &[T], page: PageRequest) -> Page<T> {
        let start = (page.offset as usize).min(items.len());
        let take = (page.limit as usize).min(self.page_size);
        let end = start.saturating_add(take).min(items.len());
        Page {
            items: items[start..end].to_vec(),
            total_count: items.len() as u32,
        }
    }

    pub fn created(&self) -> Vec<(String, CreateRecordSet)> {
        self.created.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DnsApi for FakeDnsApi {
    async fn list_zones(
        &self,
        _zone_type: ZoneType,
        page: PageRequest,
    ) -> Result<Page<ZoneRecord>, SolverError> {
        self.zone_pages.lock().unwrap().push(page);
        self.check("list zones")?;
        Ok(self.page_of(&self.zones, page))
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        name: &str,
        page: PageRequest,
    ) -> Result<Page<RecordSet>, SolverError> {
        self.record_pages
            .lock()
            .unwrap()
            .push((zone_id.to_string(), name.to_string(), page));
        self.check("list record sets")?;
        let matching: Vec<RecordSet> = self
            .record_sets
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect();
        Ok(self.page_of(&matching, page))
    }

    async fn create_record_set(
        &self,
        zone_id: &str,
        request: &CreateRecordSet,
    ) -> Result<RecordSet, SolverError> {
        self.check("create record set")?;
        let mut created = self.created.lock().unwrap();
        created.push((zone_id.to_string(), request.clone()));
        Ok(RecordSet {
            id: format!("rs-{}", created.len()),
            name: request.name.clone(),
            record_type: request.record_type.clone(),
            records: request.records.clone(),
            default: false,
            ttl: request.ttl.or(Some(300)),
        })
    }

    async fn delete_record_set(
        &self,
        zone_id: &str,
        record_set_id: &str,
    ) -> Result<String, SolverError> {
        self.check("delete record set")?;
        self.deleted
            .lock()
            .unwrap()
            .push((zone_id.to_string(), record_set_id.to_string()));
        Ok(record_set_id.to_string())
    }
}

/// Connector handing out one shared [`FakeDnsApi`]
pub struct FakeConnector {
    pub api: Arc<FakeDnsApi>,
    pub connections: Mutex<Vec<(Credentials, String)>>,
}

impl FakeConnector {
    pub fn new(api: Arc<FakeDnsApi>) -> Self {
        Self {
            api,
            connections: Mutex::new(Vec::new()),
        }
    }
}

impl DnsConnector for FakeConnector {
    fn connect(
        &self,
        credentials: Credentials,
        region_id: &str,
    ) -> Result<Arc<dyn DnsApi>, SolverError> {
        self.connections
            .lock()
            .unwrap()
            .push((credentials, region_id.to_string()));
        Ok(self.api.clone() as Arc<dyn DnsApi>)
    }
}

/// Zone finder answering with a fixed zone
pub struct FakeZoneFinder {
    pub zone: Option<String>,
}

impl FakeZoneFinder {
    pub fn returning(zone: &str) -> Self {
        Self {
            zone: Some(zone.to_string()),
        }
    }
}

#[async_trait]
impl ZoneFinder for FakeZoneFinder {
    async fn find_zone_by_fqdn(&self, fqdn: &str) -> Result<String, SolverError> {
        self.zone.clone().ok_or_else(|| {
            SolverError::DnsResolution(format!(
                "could not find the start of authority for {}",
                fqdn
            ))
        })
    }
}

/// Secrets store keyed by (namespace, name)
#[derive(Default)]
pub struct StaticSecretFetcher {
    pub secrets: HashMap<(String, String), HashMap<String, Vec<u8>>>,
}

impl StaticSecretFetcher {
    /// Store holding the default AK/SK secret
    pub fn with_credentials(access_key: &str, secret_key: &str) -> Self {
        let mut data = HashMap::new();
        data.insert("accessKey".to_string(), access_key.as_bytes().to_vec());
        data.insert("secretKey".to_string(), secret_key.as_bytes().to_vec());

        let mut secrets = HashMap::new();
        secrets.insert((NAMESPACE.to_string(), SECRET_NAME.to_string()), data);
        Self { secrets }
    }
}

#[async_trait]
impl SecretFetcher for StaticSecretFetcher {
    async fn fetch(
        &self,
        selector: &SecretKeySelector,
        namespace: &str,
    ) -> Result<Vec<u8>, SolverError> {
        let qualified = format!("{}/{}", namespace, selector.name);
        let data = self
            .secrets
            .get(&(namespace.to_string(), selector.name.clone()))
            .ok_or_else(|| SolverError::SecretNotFound(qualified.clone()))?;
        data.get(&selector.key).cloned().ok_or_else(|| {
            SolverError::KeyNotFound(format!("no key {:?} in secret {:?}", selector.key, qualified))
        })
    }
}

/// Solver recording each dispatched challenge
#[derive(Default)]
pub struct StubSolver {
    /// Fail every operation with a provider error
    pub fail: bool,
    pub calls: Mutex<Vec<(ChallengeAction, String)>>,
}

impl StubSolver {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn handle(&self, challenge: &ChallengeRequest, action: ChallengeAction) -> Result<(), SolverError> {
        self.calls
            .lock()
            .unwrap()
            .push((action, challenge.key.clone()));
        if self.fail {
            return Err(SolverError::provider("create record set", "HTTP 500: injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Solver for StubSolver {
    fn name(&self) -> &str {
        SOLVER_NAME
    }

    async fn initialize(&mut self, _kube_config: kube::Config) -> Result<(), SolverError> {
        Ok(())
    }

    async fn present(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        self.handle(challenge, ChallengeAction::Present)
            .map_err(|e| SolverError::Present(Box::new(e)))
    }

    async fn clean_up(&self, challenge: &ChallengeRequest) -> Result<(), SolverError> {
        self.handle(challenge, ChallengeAction::CleanUp)
            .map_err(|e| SolverError::CleanUp(Box::new(e)))
    }
}

pub fn zone(id: &str, name: &str) -> ZoneRecord {
    ZoneRecord {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn txt_record(id: &str, name: &str, value: &str) -> RecordSet {
    RecordSet {
        id: id.to_string(),
        name: name.to_string(),
        record_type: "TXT".to_string(),
        records: vec![value.to_string()],
        default: false,
        ttl: Some(300),
    }
}

/// Issuer config referencing the default secret
pub fn provider_config_json() -> serde_json::Value {
    serde_json::json!({
        "accessKeyRef": { "name": SECRET_NAME, "key": "accessKey" },
        "secretKeyRef": { "name": SECRET_NAME, "key": "secretKey" },
        "regionId": REGION,
    })
}

/// Challenge for `_acme-challenge.example.com.` carrying `key`
pub fn challenge(action: ChallengeAction, key: &str) -> ChallengeRequest {
    ChallengeRequest {
        uid: "c0ffee".to_string(),
        action,
        challenge_type: "dns-01".to_string(),
        dns_name: "example.com".to_string(),
        key: key.to_string(),
        resource_namespace: NAMESPACE.to_string(),
        resolved_fqdn: "_acme-challenge.example.com.".to_string(),
        resolved_zone: "example.com.".to_string(),
        allow_ambient_credentials: false,
        config: Some(provider_config_json()),
    }
}

/// Solver wired to the given provider double with valid credentials
pub fn solver_with(api: Arc<FakeDnsApi>) -> HuaweiSolver {
    HuaweiSolver::new(
        Arc::new(FakeZoneFinder::returning("example.com.")),
        Arc::new(FakeConnector::new(api)),
    )
    .with_secret_fetcher(Arc::new(StaticSecretFetcher::with_credentials(
        "AKTEST", "SKTEST",
    )))
}
