//! On-chain ERC-20 / ERC-1155 approval transactions for Polymarket.
//!
//! Plans the 4 approval transactions required before the CLOB can move
//! funds on behalf of the maker wallet:
//!
//! 1. Collateral → approve(CTF Exchange,          MAX)
//! 2. Collateral → approve(Neg Risk CTF Exchange, MAX)
//! 3. CTF        → setApprovalForAll(CTF Exchange, true)
//! 4. CTF        → setApprovalForAll(Neg Risk CTF Exchange, true)
//!
//! Fetching nonces and gas prices, checking existing allowances and
//! broadcasting are left to the caller's RPC layer; the `check_call` /
//! `is_satisfied` pair gives it the calldata and the decoding it needs.

use alloy_primitives::{Address, Bytes, U256};
use tracing::info;

use super::abi::{
    decode_bool_word, decode_uint256_word, encode_allowance, encode_approve,
    encode_is_approved_for_all, encode_set_approval_for_all,
};
use super::transaction::{SignedTransaction, Transaction};
use crate::signing::{contract_config, Signer};
use crate::Result;

/// Gas limit used for each approval.
pub const DEFAULT_APPROVAL_GAS_LIMIT: u64 = 100_000;

/// Max uint256 for unlimited approval.
const MAX_UINT256: U256 = U256::MAX;

/// Which approval a transaction grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalKind {
    /// ERC-20 `approve(spender, MAX)` on the collateral token.
    Collateral,
    /// ERC-1155 `setApprovalForAll(operator, true)` on the conditional tokens.
    ConditionalTokens,
}

/// One planned approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub kind: ApprovalKind,
    /// Token contract the call goes to.
    pub token: Address,
    /// Exchange being approved.
    pub spender: Address,
    pub transaction: Transaction,
}

impl Approval {
    /// `eth_call` target and calldata that read the current approval state for `owner`.
    pub fn check_call(&self, owner: Address) -> (Address, Bytes) {
        let data = match self.kind {
            ApprovalKind::Collateral => encode_allowance(owner, self.spender),
            ApprovalKind::ConditionalTokens => encode_is_approved_for_all(owner, self.spender),
        };
        (self.token, data)
    }

    /// Whether the `eth_call` result from [`Approval::check_call`] shows the approval in place.
    pub fn is_satisfied(&self, returndata: &[u8]) -> Result<bool> {
        match self.kind {
            ApprovalKind::Collateral => Ok(!decode_uint256_word(returndata)?.is_zero()),
            ApprovalKind::ConditionalTokens => decode_bool_word(returndata),
        }
    }
}

/// Plan the four approvals with consecutive nonces starting at `nonce`.
pub fn approval_transactions(
    chain_id: u64,
    nonce: u64,
    gas_price: u128,
    gas_limit: u64,
) -> Result<Vec<Approval>> {
    let regular = contract_config(chain_id, false)?;
    let neg_risk = contract_config(chain_id, true)?;

    let steps = [
        (ApprovalKind::Collateral, regular.collateral, regular.exchange),
        (ApprovalKind::Collateral, neg_risk.collateral, neg_risk.exchange),
        (ApprovalKind::ConditionalTokens, regular.conditional_tokens, regular.exchange),
        (ApprovalKind::ConditionalTokens, neg_risk.conditional_tokens, neg_risk.exchange),
    ];

    Ok(steps
        .into_iter()
        .zip(nonce..)
        .map(|((kind, token, spender), nonce)| {
            let data = match kind {
                ApprovalKind::Collateral => encode_approve(spender, MAX_UINT256),
                ApprovalKind::ConditionalTokens => encode_set_approval_for_all(spender, true),
            };
            Approval {
                kind,
                token,
                spender,
                transaction: Transaction {
                    nonce,
                    gas_price,
                    gas_limit,
                    to: token,
                    value: U256::ZERO,
                    data,
                    chain_id,
                },
            }
        })
        .collect())
}

/// Sign every planned approval.
pub fn sign_approvals(signer: &Signer, plan: &[Approval]) -> Result<Vec<SignedTransaction>> {
    plan.iter()
        .map(|approval| {
            let signed = approval.transaction.sign(signer)?;
            info!(
                kind = ?approval.kind,
                token = %approval.token,
                spender = %approval.spender,
                nonce = approval.transaction.nonce,
                tx_hash = %signed.hash,
                "Signed approval"
            );
            Ok(signed)
        })
        .collect()
}
