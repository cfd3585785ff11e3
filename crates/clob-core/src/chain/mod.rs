//! Transaction encoding: RLP, ABI calldata, legacy transaction signing
//! and the approval transactions the exchange needs.

pub mod abi;
pub mod approvals;
pub mod rlp;
pub mod transaction;

pub use approvals::{approval_transactions, sign_approvals, Approval, ApprovalKind};
pub use transaction::{SignedTransaction, Transaction};
