//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod credential;
mod owner;
pub mod report;
pub mod result;
mod transaction;

pub use credential::Argon2Params;
pub use owner::{Owner, OwnerId};
pub use report::{BalancePoint, KindTotals, SnapshotRow, Summary, TrendPoint};
pub use transaction::{
    parse_amount, Transaction, TransactionDraft, TransactionId, TransactionKind, AMOUNT_SCALE,
};
