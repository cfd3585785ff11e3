//! Key management and recoverable ECDSA signatures.
//!
//! Curve arithmetic and RFC 6979 nonces come from `alloy-signer-local`
//! (k256). Address derivation and all hashing stay on this crate's Keccak.

use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use serde_json::Value;
use tracing::debug;

use super::eip712::{signing_hash, Types};
use super::domain::TypedDataDomain;
use crate::keccak::keccak256;
use crate::utils::{bytes_to_hex, checksum, hex_to_bytes, lower_address};
use crate::{Error, Result};

/// Raw signature parts for transaction signing: `(r, s, recovery_id)`.
pub type SignatureParts = (B256, B256, u8);

/// A secp256k1 key with its derived address.
///
/// Signing takes `&self` and the key handle is `Send + Sync`, so a single
/// `Signer` can be shared between threads or cheaply cloned.
#[derive(Clone)]
pub struct Signer {
    inner: PrivateKeySigner,
    address: Address,
    chain_id: u64,
}

impl Signer {
    /// Load a signer from a hex secret (with or without `0x`).
    pub fn new(secret_hex: &str, chain_id: u64) -> Result<Self> {
        let secret = hex_to_bytes(secret_hex.trim())
            .map_err(|_| Error::InvalidKey("secret is not valid hex".to_string()))?;
        if secret.len() != 32 {
            return Err(Error::InvalidKey(format!(
                "expected 32 bytes, got {}",
                secret.len()
            )));
        }

        let inner = PrivateKeySigner::from_slice(&secret)
            .map_err(|e| Error::InvalidKey(e.to_string()))?;

        // Uncompressed SEC1 point: 0x04 ‖ X ‖ Y
        let public = inner.credential().verifying_key().to_encoded_point(false);
        let hash = keccak256(&public.as_bytes()[1..]);
        let address = Address::from_slice(&hash[12..]);

        debug!(address = %lower_address(&address), chain_id, "Loaded signer");

        Ok(Self {
            inner,
            address,
            chain_id,
        })
    }

    /// Derived address. Independent of the chain id.
    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address.
    pub fn address_checksummed(&self) -> String {
        checksum(&self.address)
    }

    /// Lowercase `0x` address.
    pub fn address_lowercase(&self) -> String {
        lower_address(&self.address)
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Sign a 32-byte digest, returning `r ‖ s ‖ v` with `v` in {27, 28}.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<[u8; 65]> {
        let (r, s, recovery_id) = self.sign_hash(digest)?;

        let mut out = [0u8; 65];
        out[..32].copy_from_slice(r.as_slice());
        out[32..64].copy_from_slice(s.as_slice());
        out[64] = recovery_id + 27;
        Ok(out)
    }

    /// Hex form of [`Signer::sign_digest`].
    pub fn sign(&self, digest: &[u8]) -> Result<String> {
        Ok(bytes_to_hex(&self.sign_digest(digest)?, true))
    }

    /// Sign a 32-byte digest and return the raw `(r, s, recovery_id)`.
    pub fn sign_hash(&self, digest: &[u8]) -> Result<SignatureParts> {
        if digest.len() != 32 {
            return Err(Error::InvalidDigest(digest.len()));
        }
        let hash = B256::from_slice(digest);

        let signature = self
            .inner
            .sign_hash_sync(&hash)
            .map_err(|e| Error::Signing {
                message: e.to_string(),
            })?;

        Ok((
            B256::from(signature.r().to_be_bytes::<32>()),
            B256::from(signature.s().to_be_bytes::<32>()),
            signature.v() as u8,
        ))
    }

    /// Sign EIP-712 typed data.
    pub fn sign_typed_data(
        &self,
        domain: &TypedDataDomain,
        primary_type: &str,
        message: &Value,
        types: &Types,
    ) -> Result<String> {
        let digest = signing_hash(domain, primary_type, message, types)?;
        self.sign(digest.as_slice())
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address_checksummed())
            .field("chain_id", &self.chain_id)
            .finish_non_exhaustive()
    }
}
