//! Collaborator boundaries consumed by the voucher and statement flows.
//!
//! Every call takes the caller's [`SessionContext`] explicitly; implementations
//! must reject inactive sessions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ledgerdesk_accounting::{Account, LedgerEntry, StatementRequest, VoucherSubmission, VoucherType};
use ledgerdesk_auth::SessionContext;
use ledgerdesk_core::VoucherId;

use crate::error::CollaboratorError;

/// Acknowledgement of a persisted voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherReceipt {
    pub voucher_id: VoucherId,
    pub voucher_type: VoucherType,
    pub voucher_no: u64,
}

/// Source of account directory snapshots.
#[async_trait::async_trait]
pub trait AccountDirectorySource: Send + Sync {
    async fn load_accounts(&self, session: &SessionContext) -> Result<Vec<Account>, CollaboratorError>;
}

/// Advisory next voucher number per voucher type (display only).
#[async_trait::async_trait]
pub trait VoucherNumberSource: Send + Sync {
    async fn next_voucher_number(
        &self,
        session: &SessionContext,
        voucher_type: VoucherType,
    ) -> Result<u64, CollaboratorError>;
}

/// Ledger entries for one account and date range.
///
/// Account, start and end are all mandatory; implementations reject a request
/// missing any of them.
#[async_trait::async_trait]
pub trait LedgerQuery: Send + Sync {
    async fn ledger_entries(
        &self,
        session: &SessionContext,
        request: &StatementRequest,
    ) -> Result<Vec<LedgerEntry>, CollaboratorError>;
}

/// Persistence boundary for finished vouchers. A single request/response.
#[async_trait::async_trait]
pub trait VoucherSink: Send + Sync {
    async fn submit(
        &self,
        session: &SessionContext,
        submission: &VoucherSubmission,
    ) -> Result<VoucherReceipt, CollaboratorError>;
}

#[async_trait::async_trait]
impl<S> AccountDirectorySource for Arc<S>
where
    S: AccountDirectorySource + ?Sized,
{
    async fn load_accounts(&self, session: &SessionContext) -> Result<Vec<Account>, CollaboratorError> {
        (**self).load_accounts(session).await
    }
}

#[async_trait::async_trait]
impl<S> VoucherNumberSource for Arc<S>
where
    S: VoucherNumberSource + ?Sized,
{
    async fn next_voucher_number(
        &self,
        session: &SessionContext,
        voucher_type: VoucherType,
    ) -> Result<u64, CollaboratorError> {
        (**self).next_voucher_number(session, voucher_type).await
    }
}

#[async_trait::async_trait]
impl<S> LedgerQuery for Arc<S>
where
    S: LedgerQuery + ?Sized,
{
    async fn ledger_entries(
        &self,
        session: &SessionContext,
        request: &StatementRequest,
    ) -> Result<Vec<LedgerEntry>, CollaboratorError> {
        (**self).ledger_entries(session, request).await
    }
}

#[async_trait::async_trait]
impl<S> VoucherSink for Arc<S>
where
    S: VoucherSink + ?Sized,
{
    async fn submit(
        &self,
        session: &SessionContext,
        submission: &VoucherSubmission,
    ) -> Result<VoucherReceipt, CollaboratorError> {
        (**self).submit(session, submission).await
    }
}
