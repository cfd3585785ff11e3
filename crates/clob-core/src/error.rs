//! Error types for the CLOB signing core.

use thiserror::Error;

use crate::auth::AuthLevel;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid tick size: {0}")]
    InvalidTickSize(String),

    #[error("Numeric overflow: {0}")]
    NumericOverflow(String),

    #[error("Unsupported EIP-712 type: {0}")]
    UnsupportedType(String),

    #[error("Missing typed data member: {0}")]
    MissingMember(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Digest must be 32 bytes, got {0}")]
    InvalidDigest(usize),

    #[error("Invalid order side: {0}")]
    InvalidSide(String),

    #[error("Unsupported chain id: {0}")]
    UnsupportedChain(u64),

    #[error("No match")]
    NoMatch,

    #[error("Insufficient auth level: {required:?} required, client is {actual:?}")]
    InsufficientAuthLevel {
        required: AuthLevel,
        actual: AuthLevel,
    },

    #[error("Invalid API credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("Signing error: {message}")]
    Signing { message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
