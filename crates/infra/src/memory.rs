use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use ledgerdesk_accounting::{
    Account, LedgerEntry, StatementRequest, TransactionType, VoucherSubmission, VoucherType,
    OPENING_BALANCE_LABEL,
};
use ledgerdesk_auth::SessionContext;
use ledgerdesk_core::{AccountId, DomainError, LedgerEntryId, VoucherId};

use crate::error::CollaboratorError;
use crate::ports::{
    AccountDirectorySource, LedgerQuery, VoucherNumberSource, VoucherReceipt, VoucherSink,
};

/// Balance of one leg's account just before and after it posts.
#[derive(Debug, Clone, Copy)]
struct Posting {
    previous: Decimal,
    next: Decimal,
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: Vec<Account>,
    entries: Vec<LedgerEntry>,
    /// Last issued voucher number per type.
    voucher_numbers: HashMap<VoucherType, u64>,
}

impl LedgerState {
    fn account_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == *id)
    }
}

/// In-memory ledger store implementing every collaborator port.
///
/// Intended for tests/dev. Each posted leg records the account balance just
/// before it as `previous_balance`, so queries over a range return a correct
/// carry-forward as long as vouchers are posted in date order.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account. A non-zero `opening_balance` is posted as an
    /// "Opening Balance" entry dated `opened_at`; `current_balance` is derived
    /// from it.
    pub fn open_account(
        &self,
        mut account: Account,
        opened_at: DateTime<Utc>,
    ) -> Result<(), CollaboratorError> {
        let mut state = self.write()?;

        if state.accounts.iter().any(|a| a.id == account.id || a.code == account.code) {
            return Err(CollaboratorError::rejected(format!(
                "account {} / code {} already exists",
                account.id, account.code
            )));
        }

        let opening = account.opening_balance;
        account.current_balance = opening;
        if opening != Decimal::ZERO {
            let transaction_type = if opening > Decimal::ZERO {
                TransactionType::Debit
            } else {
                TransactionType::Credit
            };
            state.entries.push(LedgerEntry {
                id: LedgerEntryId::new(),
                date: opened_at,
                account_id: account.id,
                voucher_id: None,
                transaction_type,
                amount: opening.abs(),
                description: OPENING_BALANCE_LABEL.to_string(),
                previous_balance: Some(Decimal::ZERO),
                created_at: opened_at,
            });
        }

        tracing::debug!(account_id = %account.id, code = %account.code, "opened account");
        state.accounts.push(account);
        Ok(())
    }

    pub fn account(&self, id: &AccountId) -> Result<Account, CollaboratorError> {
        self.read()?
            .accounts
            .iter()
            .find(|a| a.id == *id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("account {id}")).into())
    }

    /// Every persisted leg, in posting order.
    pub fn entries(&self) -> Result<Vec<LedgerEntry>, CollaboratorError> {
        Ok(self.read()?.entries.clone())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, LedgerState>, CollaboratorError> {
        self.inner
            .write()
            .map_err(|_| CollaboratorError::unavailable("lock poisoned"))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, LedgerState>, CollaboratorError> {
        self.inner
            .read()
            .map_err(|_| CollaboratorError::unavailable("lock poisoned"))
    }

    /// Validate `submission` and compute each leg's balance before and after
    /// posting, in leg order. Nothing is mutated, so a rejection leaves the
    /// ledger as it was.
    fn plan_postings(
        state: &LedgerState,
        submission: &VoucherSubmission,
    ) -> Result<Vec<Posting>, CollaboratorError> {
        if submission.ledger_entries.len() < 2 {
            return Err(DomainError::validation("minimum 2 ledger entries are required").into());
        }
        for (idx, line) in submission.ledger_entries.iter().enumerate() {
            if line.amount <= Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "ledger entry {idx}: amount must be positive"
                ))
                .into());
            }
            if !state.accounts.iter().any(|a| a.id == line.account_id) {
                return Err(DomainError::not_found(format!("account {}", line.account_id)).into());
            }
        }
        match (submission.debit_total(), submission.credit_total()) {
            (Some(debit), Some(credit)) if debit == credit => {}
            (Some(debit), Some(credit)) => {
                return Err(DomainError::invariant(format!(
                    "debits ({debit}) must equal credits ({credit})"
                ))
                .into());
            }
            _ => return Err(DomainError::validation("voucher total is too large").into()),
        }

        let mut balances: HashMap<AccountId, Decimal> = HashMap::new();
        let mut postings = Vec::with_capacity(submission.ledger_entries.len());
        for line in &submission.ledger_entries {
            let previous = match balances.get(&line.account_id) {
                Some(balance) => *balance,
                None => state
                    .accounts
                    .iter()
                    .find(|a| a.id == line.account_id)
                    .map(|a| a.current_balance)
                    .unwrap_or(Decimal::ZERO),
            };
            let next = previous
                .checked_add(line.transaction_type.signed(line.amount))
                .ok_or_else(|| {
                    DomainError::validation(format!(
                        "balance of account {} would leave the representable range",
                        line.account_id
                    ))
                })?;
            balances.insert(line.account_id, next);
            postings.push(Posting { previous, next });
        }
        Ok(postings)
    }
}

#[async_trait::async_trait]
impl AccountDirectorySource for InMemoryLedgerStore {
    async fn load_accounts(&self, session: &SessionContext) -> Result<Vec<Account>, CollaboratorError> {
        session.ensure_active(Utc::now())?;
        Ok(self.read()?.accounts.clone())
    }
}

#[async_trait::async_trait]
impl VoucherNumberSource for InMemoryLedgerStore {
    async fn next_voucher_number(
        &self,
        session: &SessionContext,
        voucher_type: VoucherType,
    ) -> Result<u64, CollaboratorError> {
        session.ensure_active(Utc::now())?;
        let state = self.read()?;
        Ok(state.voucher_numbers.get(&voucher_type).copied().unwrap_or(0) + 1)
    }
}

#[async_trait::async_trait]
impl LedgerQuery for InMemoryLedgerStore {
    async fn ledger_entries(
        &self,
        session: &SessionContext,
        request: &StatementRequest,
    ) -> Result<Vec<LedgerEntry>, CollaboratorError> {
        session.ensure_active(Utc::now())?;
        let range = request.validate()?;

        let state = self.read()?;
        if !state.accounts.iter().any(|a| a.id == range.account_id) {
            return Err(DomainError::not_found(format!("account {}", range.account_id)).into());
        }

        Ok(state
            .entries
            .iter()
            .filter(|e| e.account_id == range.account_id && range.contains(e.date.date_naive()))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl VoucherSink for InMemoryLedgerStore {
    async fn submit(
        &self,
        session: &SessionContext,
        submission: &VoucherSubmission,
    ) -> Result<VoucherReceipt, CollaboratorError> {
        session.ensure_active(Utc::now())?;

        let mut state = self.write()?;
        let postings = match Self::plan_postings(&state, submission) {
            Ok(postings) => postings,
            Err(err) => {
                tracing::warn!(voucher_type = %submission.voucher_type, error = %err, "voucher rejected");
                return Err(err);
            }
        };

        let voucher_id = VoucherId::new();
        let voucher_no = {
            let counter = state.voucher_numbers.entry(submission.voucher_type).or_insert(0);
            *counter += 1;
            *counter
        };
        let date = submission.date.and_time(NaiveTime::MIN).and_utc();
        let created_at = Utc::now();

        for (line, posting) in submission.ledger_entries.iter().zip(postings) {
            let Some(account) = state.account_mut(&line.account_id) else {
                // Checked above under the same lock.
                continue;
            };
            account.current_balance = posting.next;

            state.entries.push(LedgerEntry {
                id: LedgerEntryId::new(),
                date,
                account_id: line.account_id,
                voucher_id: Some(voucher_id),
                transaction_type: line.transaction_type,
                amount: line.amount,
                description: line.description.clone(),
                previous_balance: Some(posting.previous),
                created_at,
            });
        }

        tracing::info!(
            %voucher_id,
            voucher_no,
            voucher_type = %submission.voucher_type,
            total = %submission.total_amount,
            legs = submission.ledger_entries.len(),
            "voucher persisted"
        );

        Ok(VoucherReceipt {
            voucher_id,
            voucher_type: submission.voucher_type,
            voucher_no,
        })
    }
}
