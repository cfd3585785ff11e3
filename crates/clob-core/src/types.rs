//! Order and order book value types.

pub mod market;
pub mod order;

pub use market::*;
pub use order::*;
