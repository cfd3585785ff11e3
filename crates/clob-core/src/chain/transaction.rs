//! Legacy (pre EIP-1559) transactions with EIP-155 replay protection.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rlp::{encode_bytes, encode_list, encode_u128, encode_u256, encode_u64, encode_uint};
use crate::keccak::keccak256;
use crate::signing::Signer;
use crate::utils::bytes_to_hex;
use crate::{Error, Result};

/// An unsigned legacy transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub nonce: u64,
    /// Wei per gas.
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

/// A signed transaction, ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// RLP encoding of the signed transaction.
    pub raw: Bytes,
    /// Transaction hash (Keccak of `raw`).
    pub hash: B256,
    /// `recovery_id + chain_id * 2 + 35`.
    pub v: u64,
    pub r: B256,
    pub s: B256,
}

impl SignedTransaction {
    /// `0x`-prefixed hex of the raw transaction.
    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.raw, true)
    }
}

impl Transaction {
    fn base_fields(&self) -> Vec<Vec<u8>> {
        vec![
            encode_u64(self.nonce),
            encode_u128(self.gas_price),
            encode_u64(self.gas_limit),
            encode_bytes(self.to.as_slice()),
            encode_u256(self.value),
            encode_bytes(&self.data),
        ]
    }

    /// RLP of `[nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0]`.
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut fields = self.base_fields();
        fields.push(encode_u64(self.chain_id));
        fields.push(encode_bytes(&[]));
        fields.push(encode_bytes(&[]));
        encode_list(&fields)
    }

    /// Digest the sender signs.
    pub fn signing_hash(&self) -> B256 {
        keccak256(self.signing_payload())
    }

    /// Sign with EIP-155 replay protection.
    pub fn sign(&self, signer: &Signer) -> Result<SignedTransaction> {
        let (r, s, recovery_id) = signer.sign_hash(self.signing_hash().as_slice())?;

        let v = self
            .chain_id
            .checked_mul(2)
            .and_then(|v| v.checked_add(35 + recovery_id as u64))
            .ok_or_else(|| Error::NumericOverflow(format!("v for chain id {}", self.chain_id)))?;

        let mut fields = self.base_fields();
        fields.push(encode_u64(v));
        // r and s are integers: leading zeros are dropped
        fields.push(encode_uint(r.as_slice()));
        fields.push(encode_uint(s.as_slice()));

        let raw = encode_list(&fields);
        let hash = keccak256(&raw);

        debug!(
            nonce = self.nonce,
            chain_id = self.chain_id,
            to = %self.to,
            tx_hash = %hash,
            "Signed transaction"
        );

        Ok(SignedTransaction {
            raw: Bytes::from(raw),
            hash,
            v,
            r,
            s,
        })
    }
}
