//! Order enums and the arguments callers hand to the order builder.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amounts::TickSize;
use crate::{Error, Result};

/// Side of the order (buy or sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Numeric value used in the signed order struct.
    pub fn as_u8(&self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(Error::InvalidSide(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(Error::InvalidSide(other.to_string())),
        }
    }
}

/// Time-in-force of a posted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Good-til-cancelled.
    #[default]
    Gtc,
    /// Fill-or-kill.
    Fok,
    /// Good-til-date.
    Gtd,
    /// Fill-and-kill: fill what is available, cancel the rest.
    Fak,
}

/// How the order signature is verified on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SignatureType {
    /// Plain externally owned account.
    #[default]
    Eoa,
    /// Polymarket proxy wallet.
    PolyProxy,
    /// Gnosis Safe owned by the signer.
    PolyGnosisSafe,
}

impl SignatureType {
    /// Get the numeric value for signing.
    pub fn as_u8(&self) -> u8 {
        match self {
            SignatureType::Eoa => 0,
            SignatureType::PolyProxy => 1,
            SignatureType::PolyGnosisSafe => 2,
        }
    }
}

impl From<SignatureType> for u8 {
    fn from(value: SignatureType) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for SignatureType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SignatureType::Eoa),
            1 => Ok(SignatureType::PolyProxy),
            2 => Ok(SignatureType::PolyGnosisSafe),
            other => Err(Error::invalid_value(
                "signatureType",
                format!("unknown signature type {other}"),
            )),
        }
    }
}

/// A limit order request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderArgs {
    /// Outcome token id, decimal string.
    pub token_id: String,
    pub price: Decimal,
    /// Number of outcome tokens.
    pub size: Decimal,
    pub side: Side,
    #[serde(default)]
    pub fee_rate_bps: u64,
    #[serde(default)]
    pub nonce: u64,
    /// Unix seconds; zero means no expiry.
    #[serde(default)]
    pub expiration: u64,
    /// Zero address for a public order.
    #[serde(default)]
    pub taker: Address,
}

impl OrderArgs {
    pub fn new(token_id: impl Into<String>, price: Decimal, size: Decimal, side: Side) -> Self {
        Self {
            token_id: token_id.into(),
            price,
            size,
            side,
            fee_rate_bps: 0,
            nonce: 0,
            expiration: 0,
            taker: Address::ZERO,
        }
    }
}

/// A market order request.
///
/// For BUY, `amount` is collateral to spend; for SELL it is the number of
/// outcome tokens to sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderArgs {
    pub token_id: String,
    pub amount: Decimal,
    pub side: Side,
    /// Worst acceptable price. When absent it must be discovered from the book.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default = "default_market_order_type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub fee_rate_bps: u64,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub taker: Address,
}

fn default_market_order_type() -> OrderType {
    OrderType::Fok
}

impl MarketOrderArgs {
    pub fn new(token_id: impl Into<String>, amount: Decimal, side: Side) -> Self {
        Self {
            token_id: token_id.into(),
            amount,
            side,
            price: None,
            order_type: default_market_order_type(),
            fee_rate_bps: 0,
            nonce: 0,
            taker: Address::ZERO,
        }
    }
}

/// Per-market settings that shape an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderOptions {
    pub tick_size: TickSize,
    #[serde(default)]
    pub neg_risk: bool,
}
