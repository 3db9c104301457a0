// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Huawei Cloud API Gateway request signing (`SDK-HMAC-SHA256`)
//!
//! Every DNS API call is authenticated with the caller's AK/SK pair:
//!
//! 1. Build the canonical request:
//!    `METHOD\nURI/\nQUERY\nHEADERS\n\nSIGNED_HEADERS\nhex(sha256(body))`
//! 2. Build the string to sign:
//!    `SDK-HMAC-SHA256\n<X-Sdk-Date>\nhex(sha256(canonical_request))`
//! 3. Sign it with HMAC-SHA256 keyed by the secret key
//! 4. Send `Authorization: SDK-HMAC-SHA256 Access=<AK>, SignedHeaders=<..>, Signature=<..>`

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::types::SolverError;

type HmacSha256 = Hmac<Sha256>;

/// Signature algorithm identifier
pub const ALGORITHM: &str = "SDK-HMAC-SHA256";

/// Header carrying the signing timestamp
pub const HEADER_SDK_DATE: &str = "X-Sdk-Date";

/// Timestamp layout used in `X-Sdk-Date`
pub const SDK_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A request as seen by the signer
#[derive(Debug)]
pub struct SigningRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: &'a [(String, String)],
    /// Headers to sign; must include `host` and `x-sdk-date`
    pub headers: &'a [(String, String)],
    pub body: &'a [u8],
}

/// Format a timestamp for the `X-Sdk-Date` header
pub fn sdk_date(now: DateTime<Utc>) -> String {
    now.format(SDK_DATE_FORMAT).to_string()
}

/// Percent-encode path segments and force a trailing slash
pub fn canonical_uri(path: &str) -> String {
    let mut uri = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri
}

/// Sorted `key=value` pairs, both percent-encoded
pub fn canonical_query(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(String, String)> = query
        .iter()
        .map(|(k, v)| {
            (
                urlencoding::encode(k).into_owned(),
                urlencoding::encode(v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn sorted_headers(headers: &[(String, String)]) -> Vec<(String, String)> {
    let mut sorted: Vec<(String, String)> = headers
        .iter()
        .map(|(k, v)| (k.to_lowercase(), v.trim().to_string()))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}

/// `;`-joined lowercase names of the signed headers
pub fn signed_headers(headers: &[(String, String)]) -> String {
    sorted_headers(headers)
        .into_iter()
        .map(|(k, _)| k)
        .collect::<Vec<_>>()
        .join(";")
}

/// Build the canonical request string
pub fn canonical_request(request: &SigningRequest<'_>) -> String {
    let mut canonical_headers = String::new();
    for (key, value) in sorted_headers(request.headers) {
        canonical_headers.push_str(&format!("{}:{}\n", key, value));
    }

    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        request.method.to_uppercase(),
        canonical_uri(request.path),
        canonical_query(request.query),
        canonical_headers,
        signed_headers(request.headers),
        hex::encode(Sha256::digest(request.body))
    )
}

/// Compute the `Authorization` header value for a request
pub fn sign(
    request: &SigningRequest<'_>,
    access_key: &str,
    secret_key: &str,
) -> Result<String, SolverError> {
    let date = request
        .headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(HEADER_SDK_DATE))
        .map(|(_, v)| v.trim())
        .ok_or_else(|| {
            SolverError::CredentialBuild(format!("missing {} header", HEADER_SDK_DATE))
        })?;

    let canonical = canonical_request(request);
    let string_to_sign = format!(
        "{}\n{}\n{}",
        ALGORITHM,
        date,
        hex::encode(Sha256::digest(canonical.as_bytes()))
    );

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| SolverError::CredentialBuild(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(format!(
        "{} Access={}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        access_key,
        signed_headers(request.headers),
        signature
    ))
}
