//! Polymarket CLOB signing core.
//!
//! Everything a client needs to talk to the CLOB without a network stack:
//!
//! - [`keccak`]: Keccak-256 hashing
//! - [`signing`]: EIP-712 encoding, the secp256k1 [`Signer`](signing::Signer) and orders
//! - [`amounts`]: tick sizes, order amounts and book-walk market prices
//! - [`chain`]: RLP/ABI encoding and EIP-155 approval transactions
//! - [`auth`]: L1/L2 request headers
//! - [`config`]: environment and file configuration

pub mod amounts;
pub mod auth;
pub mod chain;
pub mod config;
pub mod error;
pub mod keccak;
pub mod signing;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
