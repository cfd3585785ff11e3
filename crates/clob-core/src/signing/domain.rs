//! EIP-712 domains and per-chain contract addresses for the Polymarket CLOB.

use alloy_primitives::{address, Address, B256};
use serde::{Deserialize, Serialize};

use super::eip712::hash_domain;
use crate::{Error, Result};

/// Chain ID for Polygon mainnet.
pub const POLYGON_CHAIN_ID: u64 = 137;

/// Chain ID for Polygon Amoy testnet.
pub const POLYGON_AMOY_CHAIN_ID: u64 = 80002;

/// Domain name shared by the regular and neg-risk CTF exchanges.
pub const EXCHANGE_DOMAIN_NAME: &str = "Polymarket CTF Exchange";

/// Domain name for L1 authentication.
pub const CLOB_AUTH_DOMAIN_NAME: &str = "ClobAuthDomain";

pub const DOMAIN_VERSION: &str = "1";

/// EIP-712 domain. Only the members that are `Some` take part in the separator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<B256>,
}

impl TypedDataDomain {
    /// Domain for order signing against an exchange contract.
    pub fn exchange(chain_id: u64, exchange: Address) -> Self {
        Self {
            name: Some(EXCHANGE_DOMAIN_NAME.to_string()),
            version: Some(DOMAIN_VERSION.to_string()),
            chain_id: Some(chain_id),
            verifying_contract: Some(exchange),
            salt: None,
        }
    }

    /// Domain for L1 authentication (no verifying contract).
    pub fn clob_auth(chain_id: u64) -> Self {
        Self {
            name: Some(CLOB_AUTH_DOMAIN_NAME.to_string()),
            version: Some(DOMAIN_VERSION.to_string()),
            chain_id: Some(chain_id),
            verifying_contract: None,
            salt: None,
        }
    }

    /// Compute the EIP-712 domain separator hash.
    pub fn separator(&self) -> B256 {
        hash_domain(self)
    }
}

/// Contract addresses an order or approval targets on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// CTF exchange, used as `verifyingContract` and approval spender.
    pub exchange: Address,
    /// Collateral ERC-20 (USDC).
    pub collateral: Address,
    /// Conditional tokens ERC-1155.
    pub conditional_tokens: Address,
}

const POLYGON_CONTRACTS: ContractConfig = ContractConfig {
    exchange: address!("4bFb41d5B3570DeFd03C39a9A4D8dE6Bd8B8982E"),
    collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
    conditional_tokens: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
};

const POLYGON_NEG_RISK_CONTRACTS: ContractConfig = ContractConfig {
    exchange: address!("C5d563A36AE78145C45a50134d48A1215220f80a"),
    collateral: address!("2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
    conditional_tokens: address!("4D97DCd97eC945f40cF65F87097ACe5EA0476045"),
};

const AMOY_CONTRACTS: ContractConfig = ContractConfig {
    exchange: address!("dFE02Eb6733538f8Ea35D585af8DE5958AD99E40"),
    collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
    conditional_tokens: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
};

const AMOY_NEG_RISK_CONTRACTS: ContractConfig = ContractConfig {
    exchange: address!("d91E80cF2E7be2e162c6513ceD06f1dD0dA35296"),
    collateral: address!("9c4e1703476e875070ee25b56a58b008cfb8fa78"),
    conditional_tokens: address!("69308FB512518e39F9b16112fA8d994F4e2Bf8bB"),
};

/// Look up the contracts for a chain and market flavour.
pub fn contract_config(chain_id: u64, neg_risk: bool) -> Result<ContractConfig> {
    match (chain_id, neg_risk) {
        (POLYGON_CHAIN_ID, false) => Ok(POLYGON_CONTRACTS),
        (POLYGON_CHAIN_ID, true) => Ok(POLYGON_NEG_RISK_CONTRACTS),
        (POLYGON_AMOY_CHAIN_ID, false) => Ok(AMOY_CONTRACTS),
        (POLYGON_AMOY_CHAIN_ID, true) => Ok(AMOY_NEG_RISK_CONTRACTS),
        (other, _) => Err(Error::UnsupportedChain(other)),
    }
}
