//! Order book snapshots consumed by market-order pricing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::keccak::keccak256;
use crate::types::Side;
use crate::utils::bytes_to_hex;
use crate::Result;

/// Order book data for one outcome token, as returned by the book endpoint.
///
/// Both sides are expected best first: bids descending, asks ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub market: String,
    pub asset_id: String,
    pub timestamp: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl OrderBookSnapshot {
    /// Returns the best bid price (highest buy order).
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Returns the best ask price (lowest sell order).
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Levels a market order on `side` would consume.
    pub fn levels_for(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        }
    }

    /// Keccak of the compact, key-sorted JSON form of the book (without `hash`).
    pub fn summary_hash(&self) -> Result<String> {
        let summary = BookSummary {
            asks: self.asks.iter().map(LevelSummary::from).collect(),
            asset_id: &self.asset_id,
            bids: self.bids.iter().map(LevelSummary::from).collect(),
            market: &self.market,
            timestamp: &self.timestamp,
        };
        let encoded = serde_json::to_string(&summary)?;
        Ok(bytes_to_hex(keccak256(encoded).as_slice(), true))
    }
}

// Members are declared in sorted order so the JSON keys come out sorted.
#[derive(Serialize)]
struct BookSummary<'a> {
    asks: Vec<LevelSummary>,
    asset_id: &'a str,
    bids: Vec<LevelSummary>,
    market: &'a str,
    timestamp: &'a str,
}

#[derive(Serialize)]
struct LevelSummary {
    price: String,
    size: String,
}

impl From<&PriceLevel> for LevelSummary {
    fn from(level: &PriceLevel) -> Self {
        Self {
            price: level.price.to_string(),
            size: level.size.to_string(),
        }
    }
}

/// A single price level in the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub size: Decimal,
}

impl PriceLevel {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}
