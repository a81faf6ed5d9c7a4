//! Voucher composition session: builder state plus the collaborator snapshots
//! it depends on.

use chrono::NaiveDate;
use thiserror::Error;

use ledgerdesk_accounting::{
    validate_voucher_date, AccountDirectory, VoucherEntryBuilder, VoucherType,
};
use ledgerdesk_auth::SessionContext;
use ledgerdesk_core::DomainError;

use crate::error::CollaboratorError;
use crate::ports::{AccountDirectorySource, VoucherNumberSource, VoucherReceipt, VoucherSink};

/// Why a voucher submission did not go through.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The draft is incomplete or invalid; nothing was sent.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The persistence boundary refused or failed; the draft is untouched.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// One voucher form: builder, directory snapshot and advisory number.
pub struct VoucherSession<S> {
    source: S,
    builder: VoucherEntryBuilder,
    directory: AccountDirectory,
    voucher_number: Option<u64>,
}

impl<S> VoucherSession<S>
where
    S: AccountDirectorySource + VoucherNumberSource + VoucherSink,
{
    pub fn new(source: S, voucher_type: VoucherType) -> Self {
        Self {
            source,
            builder: VoucherEntryBuilder::new(voucher_type),
            directory: AccountDirectory::empty(),
            voucher_number: None,
        }
    }

    pub fn builder(&self) -> &VoucherEntryBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut VoucherEntryBuilder {
        &mut self.builder
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    /// Next voucher number for display; `None` until loaded.
    pub fn voucher_number(&self) -> Option<u64> {
        self.voucher_number
    }

    /// Replace the directory snapshot and refresh displayed balances.
    ///
    /// The first cash/bank account becomes the voucher account once per
    /// session, unless the user already picked one.
    pub async fn load_directory(&mut self, session: &SessionContext) -> Result<(), CollaboratorError> {
        let accounts = self.source.load_accounts(session).await?;
        self.directory = AccountDirectory::new(accounts);

        self.builder.voucher_account_mut().adopt_default(&self.directory);
        self.builder.voucher_account_mut().refresh_balance(&self.directory);
        self.builder
            .current_mut()
            .account_mut()
            .refresh_balance(&self.directory);

        tracing::info!(accounts = self.directory.len(), "account directory loaded");
        Ok(())
    }

    pub async fn load_voucher_number(
        &mut self,
        session: &SessionContext,
    ) -> Result<u64, CollaboratorError> {
        let next = self
            .source
            .next_voucher_number(session, self.builder.voucher_type())
            .await?;
        self.voucher_number = Some(next);
        Ok(next)
    }

    /// Validate, assemble and persist the voucher.
    ///
    /// On success the draft is reset and both snapshots are reloaded; a reload
    /// failure is logged but does not fail the submission. On any error the
    /// draft is left exactly as it was.
    pub async fn submit(
        &mut self,
        session: &SessionContext,
        date: NaiveDate,
        today: NaiveDate,
    ) -> Result<VoucherReceipt, SubmitError> {
        validate_voucher_date(date, today)?;
        let submission = self.builder.finalize(date)?;

        let receipt = match self.source.submit(session, &submission).await {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(
                    voucher_type = %submission.voucher_type,
                    error = %err,
                    "voucher submission failed"
                );
                return Err(err.into());
            }
        };

        tracing::info!(
            voucher_id = %receipt.voucher_id,
            voucher_no = receipt.voucher_no,
            pairs = self.builder.pair_count(),
            "voucher submitted"
        );
        self.builder.reset();

        if let Err(err) = self.load_directory(session).await {
            tracing::warn!(error = %err, "account directory reload failed after submit");
        }
        if let Err(err) = self.load_voucher_number(session).await {
            tracing::warn!(error = %err, "voucher number reload failed after submit");
        }

        Ok(receipt)
    }

    /// Abandon the draft. Nothing is sent.
    pub fn cancel(&mut self) {
        self.builder.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use ledgerdesk_accounting::{Account, AccountType, VoucherSubmission};
    use ledgerdesk_auth::AccessToken;
    use ledgerdesk_core::{AccountId, UserId};

    use super::*;
    use crate::memory::InMemoryLedgerStore;

    const CASH: AccountId = AccountId::from_u128(1);
    const RENT: AccountId = AccountId::from_u128(2);

    fn session() -> SessionContext {
        SessionContext::login(UserId::from_u128(1), AccessToken::new("t"), Utc::now(), Duration::hours(1))
            .unwrap()
    }

    fn store() -> Arc<InMemoryLedgerStore> {
        let store = InMemoryLedgerStore::new();
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut cash = Account::new(CASH, "1000", "Cash", AccountType::Cash);
        cash.opening_balance = Decimal::from(1000);
        store.open_account(cash, opened).unwrap();
        store
            .open_account(Account::new(RENT, "5000", "Rent", AccountType::Expense), opened)
            .unwrap();
        Arc::new(store)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn compose_rent<S>(voucher: &mut VoucherSession<S>, amount: &str)
    where
        S: AccountDirectorySource + VoucherNumberSource + VoucherSink,
    {
        let directory = voucher.directory().clone();
        let current = voucher.builder_mut().current_mut();
        assert!(current.account_mut().type_code(&directory, "5000"));
        current.set_amount_text(amount);
        current.set_description("January rent");
        voucher.builder_mut().add_entry().unwrap();
    }

    #[tokio::test]
    async fn load_adopts_default_voucher_account_once() {
        let s = session();
        let mut voucher = VoucherSession::new(store(), VoucherType::Payment);
        voucher.load_directory(&s).await.unwrap();
        assert_eq!(voucher.builder().voucher_account().account_id(), Some(CASH));
        assert_eq!(voucher.builder().voucher_account().balance(), Decimal::from(1000));

        voucher.builder_mut().voucher_account_mut().clear();
        voucher.load_directory(&s).await.unwrap();
        assert_eq!(voucher.builder().voucher_account().account_id(), None);
    }

    #[tokio::test]
    async fn submit_resets_draft_and_reloads_snapshots() {
        let s = session();
        let mut voucher = VoucherSession::new(store(), VoucherType::Payment);
        voucher.load_directory(&s).await.unwrap();
        assert_eq!(voucher.load_voucher_number(&s).await.unwrap(), 1);

        compose_rent(&mut voucher, "300");
        let receipt = voucher.submit(&s, date(15), date(20)).await.unwrap();
        assert_eq!(receipt.voucher_no, 1);

        assert_eq!(voucher.builder().pair_count(), 0);
        assert_eq!(voucher.voucher_number(), Some(2));
        assert_eq!(voucher.builder().voucher_account().account_id(), Some(CASH));
        assert_eq!(voucher.builder().voucher_account().balance(), Decimal::from(700));
    }

    #[tokio::test]
    async fn invalid_drafts_are_not_sent() {
        let s = session();
        let store = store();
        let mut voucher = VoucherSession::new(store.clone(), VoucherType::Payment);
        voucher.load_directory(&s).await.unwrap();

        let err = voucher.submit(&s, date(15), date(20)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));

        compose_rent(&mut voucher, "300");
        let err = voucher.submit(&s, date(21), date(20)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));
        assert_eq!(voucher.builder().pair_count(), 1);
        assert_eq!(store.entries().unwrap().len(), 1);
    }

    struct FailingSink {
        inner: Arc<InMemoryLedgerStore>,
        fail: AtomicBool,
    }

    #[async_trait::async_trait]
    impl AccountDirectorySource for FailingSink {
        async fn load_accounts(&self, session: &SessionContext) -> Result<Vec<Account>, CollaboratorError> {
            self.inner.load_accounts(session).await
        }
    }

    #[async_trait::async_trait]
    impl VoucherNumberSource for FailingSink {
        async fn next_voucher_number(
            &self,
            session: &SessionContext,
            voucher_type: VoucherType,
        ) -> Result<u64, CollaboratorError> {
            self.inner.next_voucher_number(session, voucher_type).await
        }
    }

    #[async_trait::async_trait]
    impl VoucherSink for FailingSink {
        async fn submit(
            &self,
            session: &SessionContext,
            submission: &VoucherSubmission,
        ) -> Result<VoucherReceipt, CollaboratorError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(CollaboratorError::unavailable("connection refused"));
            }
            self.inner.submit(session, submission).await
        }
    }

    #[tokio::test]
    async fn collaborator_failure_keeps_draft_for_retry() {
        let s = session();
        let sink = Arc::new(FailingSink {
            inner: store(),
            fail: AtomicBool::new(true),
        });
        let mut voucher = VoucherSession::new(sink.clone(), VoucherType::Payment);
        voucher.load_directory(&s).await.unwrap();
        compose_rent(&mut voucher, "1,250");

        let before = voucher.builder().pairs().to_vec();
        let err = voucher.submit(&s, date(15), date(20)).await.unwrap_err();
        assert!(matches!(err, SubmitError::Collaborator(CollaboratorError::Unavailable(_))));
        assert_eq!(voucher.builder().pairs(), before.as_slice());

        sink.fail.store(false, Ordering::SeqCst);
        let receipt = voucher.submit(&s, date(15), date(20)).await.unwrap();
        assert_eq!(receipt.voucher_no, 1);
    }

    #[tokio::test]
    async fn cancel_discards_draft() {
        let s = session();
        let mut voucher = VoucherSession::new(store(), VoucherType::Payment);
        voucher.load_directory(&s).await.unwrap();
        compose_rent(&mut voucher, "300");
        voucher.cancel();
        assert_eq!(voucher.builder().pair_count(), 0);
        assert_eq!(voucher.builder().voucher_account().account_id(), Some(CASH));
    }
}
