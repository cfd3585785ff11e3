//! L1 (wallet signature) and L2 (API key HMAC) request authentication.
//!
//! L1 headers prove control of the wallet with an EIP-712 `ClobAuth`
//! signature and are used to create or derive API keys. L2 headers sign
//! each request with the API secret.

use std::collections::BTreeMap;

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use tracing::debug;

use crate::signing::{Signer, TypedDataDomain, TypedDataField, Types};
use crate::{Error, Result};

pub const POLY_ADDRESS: &str = "POLY_ADDRESS";
pub const POLY_SIGNATURE: &str = "POLY_SIGNATURE";
pub const POLY_TIMESTAMP: &str = "POLY_TIMESTAMP";
pub const POLY_NONCE: &str = "POLY_NONCE";
pub const POLY_API_KEY: &str = "POLY_API_KEY";
pub const POLY_PASSPHRASE: &str = "POLY_PASSPHRASE";

/// Fixed attestation signed in every L1 challenge.
pub const CLOB_AUTH_MESSAGE: &str = "This message attests that I control the given wallet";

const CLOB_AUTH_PRIMARY_TYPE: &str = "ClobAuth";

/// Header name to value, merged verbatim into the outbound request.
pub type AuthHeaders = BTreeMap<&'static str, String>;

/// Trust tier a client has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AuthLevel {
    /// Public endpoints only.
    L0,
    /// Has a signer.
    L1,
    /// Has a signer and API credentials.
    L2,
}

impl AuthLevel {
    /// Fail with `InsufficientAuthLevel` if `self` is below `required`.
    pub fn require(self, required: AuthLevel) -> Result<()> {
        if self >= required {
            Ok(())
        } else {
            Err(Error::InsufficientAuthLevel {
                required,
                actual: self,
            })
        }
    }
}

/// API credentials for authenticated CLOB requests.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCredentials {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    /// URL-safe base64, padding optional.
    #[serde(rename = "secret")]
    pub api_secret: String,
    #[serde(rename = "passphrase")]
    pub api_passphrase: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("api_passphrase", &"[REDACTED]")
            .finish()
    }
}

impl ApiCredentials {
    /// Create new API credentials.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        api_passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            api_passphrase: api_passphrase.into(),
        }
    }
}

/// Get current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// `ClobAuth(address address,string timestamp,uint256 nonce,string message)`.
pub fn clob_auth_types() -> Types {
    let mut types = Types::new();
    types.insert(
        CLOB_AUTH_PRIMARY_TYPE.to_string(),
        vec![
            TypedDataField::new("address", "address"),
            TypedDataField::new("timestamp", "string"),
            TypedDataField::new("nonce", "uint256"),
            TypedDataField::new("message", "string"),
        ],
    );
    types
}

/// Sign the L1 `ClobAuth` challenge.
pub fn sign_clob_auth_message(signer: &Signer, timestamp: u64, nonce: u64) -> Result<String> {
    let message = json!({
        "address": signer.address_checksummed(),
        "timestamp": timestamp.to_string(),
        "nonce": nonce,
        "message": CLOB_AUTH_MESSAGE,
    });

    signer.sign_typed_data(
        &TypedDataDomain::clob_auth(signer.chain_id()),
        CLOB_AUTH_PRIMARY_TYPE,
        &message,
        &clob_auth_types(),
    )
}

/// Headers for L1 endpoints (API key creation and derivation). The nonce defaults to 0.
pub fn create_l1_headers(
    signer: &Signer,
    timestamp: u64,
    nonce: Option<u64>,
) -> Result<AuthHeaders> {
    let nonce = nonce.unwrap_or(0);
    let signature = sign_clob_auth_message(signer, timestamp, nonce)?;
    debug!(address = %signer.address_checksummed(), nonce, "Created L1 headers");

    Ok(AuthHeaders::from([
        (POLY_ADDRESS, signer.address_checksummed()),
        (POLY_SIGNATURE, signature),
        (POLY_TIMESTAMP, timestamp.to_string()),
        (POLY_NONCE, nonce.to_string()),
    ]))
}

/// Decode an API secret stored as URL-safe base64 with or without padding.
pub fn decode_api_secret(secret: &str) -> Result<Vec<u8>> {
    let mut normalized: String = secret
        .trim()
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }

    STANDARD
        .decode(normalized.as_bytes())
        .map_err(|e| Error::InvalidCredentials(format!("API secret is not base64: {e}")))
}

/// HMAC-SHA256 over `timestamp ‖ method ‖ path ‖ body`, URL-safe base64 with padding.
pub fn build_hmac_signature(
    secret: &str,
    timestamp: u64,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<String> {
    let key = decode_api_secret(secret)?;

    let mut mac = Hmac::<Sha256>::new_from_slice(&key)
        .map_err(|e| Error::InvalidCredentials(format!("Failed to create HMAC: {e}")))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    if let Some(body) = body {
        mac.update(body.as_bytes());
    }

    Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// Headers for L2 endpoints.
pub fn create_l2_headers(
    signer: &Signer,
    credentials: &ApiCredentials,
    timestamp: u64,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> Result<AuthHeaders> {
    let signature = build_hmac_signature(&credentials.api_secret, timestamp, method, path, body)?;
    debug!(method, path, "Created L2 headers");

    Ok(AuthHeaders::from([
        (POLY_ADDRESS, signer.address_lowercase()),
        (POLY_API_KEY, credentials.api_key.clone()),
        (POLY_PASSPHRASE, credentials.api_passphrase.clone()),
        (POLY_SIGNATURE, signature),
        (POLY_TIMESTAMP, timestamp.to_string()),
    ]))
}
