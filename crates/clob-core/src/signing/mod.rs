//! Signing module for Polymarket CLOB orders.
//!
//! This module provides the EIP-712 encoder, the key holder that produces
//! recoverable signatures, and the order builder that ties them together.
//!
//! # Architecture
//!
//! ```text
//! OrderArgs / MarketOrderArgs
//!       │
//!       ▼
//! OrderBuilder ── amounts ──► Order
//!       │                       │
//!       │                       ▼
//!       │          eip712::signing_hash(domain, Order)
//!       │                       │
//!       └──────── Signer ◄──────┘
//!                   │
//!                   ▼
//!              SignedOrder ──► OrderPayload (JSON body)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use clob_core::signing::{OrderBuilder, Signer};
//! use clob_core::types::{CreateOrderOptions, OrderArgs, Side, SignatureType};
//! use clob_core::amounts::TickSize;
//! use rust_decimal::Decimal;
//!
//! let signer = Signer::new("0x...", 137)?;
//! let builder = OrderBuilder::new(signer, SignatureType::Eoa, None);
//!
//! let args = OrderArgs::new("1234", Decimal::new(50, 2), Decimal::from(100), Side::Buy);
//! let options = CreateOrderOptions { tick_size: TickSize::Hundredth, neg_risk: false };
//! let signed = builder.create_order(&args, &options)?;
//! let body = signed.to_payload(&api_key, OrderType::Gtc);
//! ```

pub mod domain;
pub mod eip712;
pub mod order_types;
pub mod signer;

pub use domain::{
    contract_config, ContractConfig, TypedDataDomain, POLYGON_AMOY_CHAIN_ID, POLYGON_CHAIN_ID,
};

pub use eip712::{TypedData, TypedDataField, Types};

pub use order_types::{
    generate_salt, order_types, Order, OrderBuilder, OrderJson, OrderPayload, SignedOrder,
};

pub use signer::{SignatureParts, Signer};
