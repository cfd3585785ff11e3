//! CLOB signer
//!
//! Root crate that exposes the core library to the integration tests and
//! benchmarks. Use `clob-core` directly in applications.

pub use clob_core as core;
