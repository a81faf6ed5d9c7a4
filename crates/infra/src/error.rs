use thiserror::Error;

use ledgerdesk_auth::SessionError;
use ledgerdesk_core::DomainError;

/// Failure reported by an external collaborator (directory, ledger query,
/// voucher numbering, persistence).
///
/// Surfaced to the caller as-is; nothing in this crate retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("session rejected: {0}")]
    Session(#[from] SessionError),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
