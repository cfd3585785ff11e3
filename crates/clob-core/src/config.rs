//! Client configuration: signing key, chain and optional API credentials.

use std::env;
use std::path::Path;

use alloy_primitives::Address;
use serde::Deserialize;

use crate::auth::{ApiCredentials, AuthLevel};
use crate::signing::{OrderBuilder, Signer, POLYGON_CHAIN_ID};
use crate::types::SignatureType;
use crate::utils::parse_address;
use crate::{Error, Result};

/// Signing client configuration.
#[derive(Clone)]
pub struct Config {
    pub chain_id: u64,
    /// Hex secp256k1 secret, `0x` optional.
    pub private_key: String,
    pub signature_type: SignatureType,
    /// Wallet holding the funds, when it differs from the signer.
    pub funder: Option<Address>,
    pub credentials: Option<ApiCredentials>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("chain_id", &self.chain_id)
            .field("private_key", &"[REDACTED]")
            .field("signature_type", &self.signature_type)
            .field("funder", &self.funder)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// File layout; every key can be overridden by a `CLOB_`-prefixed variable.
#[derive(Debug, Deserialize)]
struct FileConfig {
    private_key: Option<String>,
    chain_id: Option<u64>,
    signature_type: Option<u8>,
    funder: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
    api_passphrase: Option<String>,
}

fn config_error(message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
    }
}

fn parse_signature_type(value: u8) -> Result<SignatureType> {
    SignatureType::try_from(value)
        .map_err(|_| config_error(format!("signature type {value} is not 0, 1 or 2")))
}

fn parse_funder(value: Option<String>) -> Result<Option<Address>> {
    value
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_address(&s).map_err(|e| config_error(format!("funder: {e}"))))
        .transpose()
}

/// All three credential parts or none of them.
fn parse_credentials(
    api_key: Option<String>,
    api_secret: Option<String>,
    api_passphrase: Option<String>,
) -> Result<Option<ApiCredentials>> {
    match (api_key, api_secret, api_passphrase) {
        (Some(key), Some(secret), Some(passphrase)) => {
            Ok(Some(ApiCredentials::new(key, secret, passphrase)))
        }
        (None, None, None) => Ok(None),
        _ => Err(config_error(
            "API key, secret and passphrase must be set together",
        )),
    }
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present).
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let private_key = lookup("CLOB_PRIVATE_KEY").ok_or_else(|| {
            config_error("CLOB_PRIVATE_KEY environment variable not set")
        })?;

        let chain_id = match lookup("CLOB_CHAIN_ID") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| config_error(format!("CLOB_CHAIN_ID '{raw}' is not a number")))?,
            None => POLYGON_CHAIN_ID,
        };

        let signature_type = match lookup("CLOB_SIGNATURE_TYPE") {
            Some(raw) => parse_signature_type(raw.trim().parse().map_err(|_| {
                config_error(format!("CLOB_SIGNATURE_TYPE '{raw}' is not a number"))
            })?)?,
            None => SignatureType::Eoa,
        };

        Ok(Self {
            chain_id,
            private_key,
            signature_type,
            funder: parse_funder(lookup("CLOB_FUNDER"))?,
            credentials: parse_credentials(
                lookup("POLY_API_KEY"),
                lookup("POLY_API_SECRET"),
                lookup("POLY_API_PASSPHRASE"),
            )?,
        })
    }

    /// Load a TOML/JSON/YAML file, with `CLOB_*` environment overrides.
    #[allow(clippy::result_large_err)]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw: FileConfig = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("CLOB"))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            chain_id: raw.chain_id.unwrap_or(POLYGON_CHAIN_ID),
            private_key: raw
                .private_key
                .ok_or_else(|| config_error("private_key is required"))?,
            signature_type: parse_signature_type(raw.signature_type.unwrap_or(0))?,
            funder: parse_funder(raw.funder)?,
            credentials: parse_credentials(raw.api_key, raw.api_secret, raw.api_passphrase)?,
        })
    }

    /// Highest auth level this configuration can reach.
    pub fn auth_level(&self) -> AuthLevel {
        if self.credentials.is_some() {
            AuthLevel::L2
        } else {
            AuthLevel::L1
        }
    }

    pub fn signer(&self) -> Result<Signer> {
        Signer::new(&self.private_key, self.chain_id)
            .map_err(|e| config_error(format!("private key: {e}")))
    }

    pub fn order_builder(&self) -> Result<OrderBuilder> {
        Ok(OrderBuilder::new(
            self.signer()?,
            self.signature_type,
            self.funder,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const TEST_PRIVATE_KEY: &str =
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("CLOB_PRIVATE_KEY", TEST_PRIVATE_KEY)]))
            .unwrap();
        assert_eq!(config.chain_id, 137);
        assert_eq!(config.signature_type, SignatureType::Eoa);
        assert!(config.funder.is_none());
        assert!(config.credentials.is_none());
        assert_eq!(config.auth_level(), AuthLevel::L1);
    }

    #[test]
    fn test_full_environment() {
        let config = Config::from_lookup(lookup_from(&[
            ("CLOB_PRIVATE_KEY", TEST_PRIVATE_KEY),
            ("CLOB_CHAIN_ID", "80002"),
            ("CLOB_SIGNATURE_TYPE", "2"),
            ("CLOB_FUNDER", "0x1111111111111111111111111111111111111111"),
            ("POLY_API_KEY", "key"),
            ("POLY_API_SECRET", "c2VjcmV0"),
            ("POLY_API_PASSPHRASE", "pass"),
        ]))
        .unwrap();

        assert_eq!(config.chain_id, 80002);
        assert_eq!(config.signature_type, SignatureType::PolyGnosisSafe);
        assert_eq!(config.funder, Some(Address::repeat_byte(0x11)));
        assert_eq!(config.auth_level(), AuthLevel::L2);

        let builder = config.order_builder().unwrap();
        assert_eq!(builder.funder(), Address::repeat_byte(0x11));
        assert_eq!(builder.signer().chain_id(), 80002);
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[])),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_partial_credentials_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("CLOB_PRIVATE_KEY", TEST_PRIVATE_KEY),
            ("POLY_API_KEY", "key"),
        ]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_malformed_values() {
        for (key, value) in [
            ("CLOB_CHAIN_ID", "polygon"),
            ("CLOB_SIGNATURE_TYPE", "7"),
            ("CLOB_FUNDER", "0x1234"),
        ] {
            let result = Config::from_lookup(lookup_from(&[
                ("CLOB_PRIVATE_KEY", TEST_PRIVATE_KEY),
                (key, value),
            ]));
            assert!(matches!(result, Err(Error::Config { .. })), "{key}={value}");
        }
    }

    #[test]
    fn test_bad_private_key() {
        let config =
            Config::from_lookup(lookup_from(&[("CLOB_PRIVATE_KEY", "0x1234")])).unwrap();
        assert!(matches!(config.signer(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = Config::from_lookup(lookup_from(&[("CLOB_PRIVATE_KEY", TEST_PRIVATE_KEY)]))
            .unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("ac0974bec39a17e3"));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
private_key = "{TEST_PRIVATE_KEY}"
chain_id = 80002
signature_type = 1
api_key = "key"
api_secret = "c2VjcmV0"
api_passphrase = "pass"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.chain_id, 80002);
        assert_eq!(config.signature_type, SignatureType::PolyProxy);
        assert_eq!(config.credentials.as_ref().unwrap().api_key, "key");
        assert_eq!(
            config.signer().unwrap().address_checksummed(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_file_without_key() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"chain_id": 137}}"#).unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }
}
