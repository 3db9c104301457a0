// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Authoritative zone resolution
//!
//! The provider identifies zones by an internal id, so mapping a challenged
//! FQDN to a zone takes two steps:
//! 1. Walk the FQDN's labels upward issuing SOA queries until one answers;
//!    that owner name is the authoritative zone (trailing-dot form)
//! 2. Match the zone name exactly against the account's zone list
//!
//! Nothing is cached: each call queries DNS and the provider afresh.

use async_trait::async_trait;
use hickory_resolver::{
    config::{NameServerConfigGroup, ResolverConfig},
    name_server::TokioConnectionProvider,
    proto::rr::RecordType,
    Resolver, TokioResolver,
};
use std::net::SocketAddr;
use tracing::debug;

use crate::{
    config::ZoneType,
    huawei::{DnsApi, ZoneRecord},
    pagination::list_all,
    types::SolverError,
};

/// Finds the authoritative zone of an FQDN in public DNS
#[async_trait]
pub trait ZoneFinder: Send + Sync {
    /// Returns the zone name in canonical trailing-dot form (e.g. "example.com.")
    async fn find_zone_by_fqdn(&self, fqdn: &str) -> Result<String, SolverError>;
}

/// [`ZoneFinder`] issuing SOA queries through hickory-resolver
pub struct HickoryZoneFinder {
    resolver: TokioResolver,
}

impl HickoryZoneFinder {
    /// Create a finder using the given recursive nameservers, or the system
    /// resolver configuration when the list is empty
    pub fn new(nameservers: &[SocketAddr]) -> Result<Self, SolverError> {
        let resolver = if nameservers.is_empty() {
            Resolver::builder_tokio()
                .map_err(|e| {
                    SolverError::ClientBuild(format!("failed to read system resolver config: {}", e))
                })?
                .build()
        } else {
            let mut group = NameServerConfigGroup::new();
            for addr in nameservers {
                group.merge(NameServerConfigGroup::from_ips_clear(
                    &[addr.ip()],
                    addr.port(),
                    true,
                ));
            }
            Resolver::builder_with_config(
                ResolverConfig::from_parts(None, vec![], group),
                TokioConnectionProvider::default(),
            )
            .build()
        };

        Ok(Self { resolver })
    }
}

#[async_trait]
impl ZoneFinder for HickoryZoneFinder {
    async fn find_zone_by_fqdn(&self, fqdn: &str) -> Result<String, SolverError> {
        for candidate in candidate_zones(fqdn) {
            debug!("querying SOA for {}", candidate);
            match self.resolver.soa_lookup(candidate.as_str()).await {
                Ok(lookup) => {
                    let soa_owner = lookup
                        .as_lookup()
                        .records()
                        .iter()
                        .find(|record| record.record_type() == RecordType::SOA)
                        .map(|record| record.name().to_utf8());
                    if let Some(zone) = soa_owner {
                        debug!("authoritative zone for {} is {}", fqdn, zone);
                        return Ok(to_fqdn(&zone));
                    }
                }
                Err(e) if e.is_no_records_found() => continue,
                Err(e) => {
                    return Err(SolverError::DnsResolution(format!(
                        "SOA lookup for {} failed: {}",
                        candidate, e
                    )))
                }
            }
        }

        Err(SolverError::DnsResolution(format!(
            "could not find the start of authority for {}",
            fqdn
        )))
    }
}

/// Names to probe for an SOA record, most specific first, root excluded
///
/// `_acme-challenge.example.com` yields
/// `["_acme-challenge.example.com.", "example.com.", "com."]`.
pub fn candidate_zones(fqdn: &str) -> Vec<String> {
    let name = un_fqdn(fqdn);
    if name.is_empty() {
        return Vec::new();
    }

    let labels: Vec<&str> = name.split('.').collect();
    (0..labels.len())
        .map(|i| format!("{}.", labels[i..].join(".")))
        .collect()
}

/// Strip a single trailing dot
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Append a trailing dot if missing
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Pick the id of the zone whose name equals the authoritative zone.
///
/// Names are compared after trailing-dot normalization. A suffix match is not
/// a match. The first equal entry wins; an empty id counts as not found.
pub fn find_zone_id(zones: &[ZoneRecord], authoritative_zone: &str) -> Result<String, SolverError> {
    let wanted = un_fqdn(authoritative_zone);

    match zones.iter().find(|zone| un_fqdn(&zone.name) == wanted) {
        Some(zone) if !zone.id.is_empty() => Ok(zone.id.clone()),
        _ => Err(SolverError::ZoneNotFound(format!(
            "zone {} not found in Huawei Cloud DNS",
            wanted
        ))),
    }
}

/// Resolve the provider zone id owning `fqdn`
pub async fn resolve_zone_id(
    api: &dyn DnsApi,
    finder: &dyn ZoneFinder,
    fqdn: &str,
    zone_type: ZoneType,
) -> Result<String, SolverError> {
    let authoritative_zone = finder.find_zone_by_fqdn(fqdn).await?;
    let zones = list_all(|page| api.list_zones(zone_type, page)).await?;
    debug!(
        "matching {} against {} {} zones",
        authoritative_zone,
        zones.len(),
        zone_type.as_str()
    );
    find_zone_id(&zones, &authoritative_zone)
}

/// Relative record label for `fqdn` inside `zone`.
///
/// Everything before the first `"." + zone` occurrence; when the zone does not
/// appear (e.g. the FQDN is the apex) the FQDN minus one trailing dot.
pub fn extract_record_name(fqdn: &str, zone: &str) -> String {
    match fqdn.find(&format!(".{}", zone)) {
        Some(idx) => fqdn[..idx].to_string(),
        None => un_fqdn(fqdn).to_string(),
    }
}
