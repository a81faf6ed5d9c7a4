//! Accounting module: voucher composition and account statements.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Accounts
//! and persisted ledger entries are read-only inputs owned by the ledger store;
//! voucher drafts are owned by a single composition session.

pub mod account;
pub mod dates;
pub mod money;
pub mod selection;
pub mod statement;
pub mod voucher;

pub use account::{Account, AccountDirectory, AccountLabel, AccountScope, AccountType};
pub use money::{BalanceLabel, BalanceSide};
pub use selection::AccountSelection;
pub use statement::{
    build as build_statement, sort_entries, LedgerEntry, RowKind, Statement, StatementForm,
    StatementRange, StatementRequest, StatementRow, BALANCE_BROUGHT_FORWARD_LABEL,
    OPENING_BALANCE_LABEL,
};
pub use voucher::{
    validate_voucher_date, BuilderState, CurrentEntry, EntryPair, LedgerEntryDraft,
    SubmissionLine, TransactionType, VoucherEntryBuilder, VoucherSubmission, VoucherType,
};
