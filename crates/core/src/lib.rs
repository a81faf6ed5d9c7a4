//! `ledgerdesk-core` — shared domain primitives for the voucher and ledger engine.
//!
//! Pure domain types only: no IO, no transport, no persistence.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AccountId, LedgerEntryId, UserId, VoucherId};
