//! Account statement reconstruction.
//!
//! Persisted ledger entries for one account and date range are ordered
//! chronologically (the "Opening Balance" entry always first), a carried-forward
//! balance is taken from the first entry, and a running signed balance is
//! attached to every row.

use core::cmp::Ordering;

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerdesk_core::{AccountId, DomainError, DomainResult, LedgerEntryId, VoucherId};

use crate::account::{AccountDirectory, AccountLabel, AccountScope};
use crate::dates;
use crate::money::{group_thousands, BalanceLabel};
use crate::selection::AccountSelection;
use crate::voucher::TransactionType;

/// Description of the entry that always sorts first.
pub const OPENING_BALANCE_LABEL: &str = "Opening Balance";

/// Description of the synthesized carry-forward row.
pub const BALANCE_BROUGHT_FORWARD_LABEL: &str = "Balance B/f";

const EMPTY_CELL: &str = "-";

/// A persisted ledger leg as returned by the ledger query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    #[serde(with = "crate::dates::timestamp")]
    pub date: DateTime<Utc>,
    pub account_id: AccountId,
    #[serde(default)]
    pub voucher_id: Option<VoucherId>,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: String,
    /// Account balance immediately before this entry.
    #[serde(default)]
    pub previous_balance: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn is_opening_balance(&self) -> bool {
        self.description == OPENING_BALANCE_LABEL
    }

    /// Effect on a debit-positive balance.
    pub fn signed_amount(&self) -> Decimal {
        self.transaction_type.signed(self.amount)
    }
}

fn statement_order(a: &LedgerEntry, b: &LedgerEntry) -> Ordering {
    match (a.is_opening_balance(), b.is_opening_balance()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.date.cmp(&b.date),
    }
}

/// Stable statement ordering: opening balance first, then ascending date.
///
/// Entries that compare equal keep their input order.
pub fn sort_entries(entries: &mut [LedgerEntry]) {
    entries.sort_by(statement_order);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    BroughtForward,
    Entry,
}

/// One display row of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    pub kind: RowKind,
    pub entry_id: Option<LedgerEntryId>,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    /// Running balance after this row.
    pub balance: BalanceLabel,
}

impl StatementRow {
    fn brought_forward(balance: Decimal) -> Self {
        Self {
            kind: RowKind::BroughtForward,
            entry_id: None,
            date: None,
            description: BALANCE_BROUGHT_FORWARD_LABEL.to_string(),
            debit: None,
            credit: None,
            balance: BalanceLabel::from_signed(balance),
        }
    }

    fn entry(entry: &LedgerEntry, running: Decimal) -> Self {
        let (debit, credit) = match entry.transaction_type {
            TransactionType::Debit => (Some(entry.amount), None),
            TransactionType::Credit => (None, Some(entry.amount)),
        };
        Self {
            kind: RowKind::Entry,
            entry_id: Some(entry.id),
            date: Some(entry.date.date_naive()),
            description: entry.description.clone(),
            debit,
            credit,
            balance: BalanceLabel::from_signed(running),
        }
    }

    /// `dd/mm/yyyy`, or `-` for the carry-forward row.
    pub fn date_display(&self) -> String {
        self.date
            .map(dates::format_row_date)
            .unwrap_or_else(|| EMPTY_CELL.to_string())
    }

    pub fn debit_display(&self) -> String {
        cell(self.debit)
    }

    pub fn credit_display(&self) -> String {
        cell(self.credit)
    }

    pub fn balance_display(&self) -> String {
        self.balance.to_string()
    }
}

fn cell(amount: Option<Decimal>) -> String {
    amount
        .map(group_thousands)
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// A rendered account statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub account: Option<AccountLabel>,
    pub balance_before: Decimal,
    pub rows: Vec<StatementRow>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub closing_balance: Decimal,
}

impl Statement {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn balance_before_label(&self) -> BalanceLabel {
        BalanceLabel::from_signed(self.balance_before)
    }

    pub fn closing_label(&self) -> BalanceLabel {
        BalanceLabel::from_signed(self.closing_balance)
    }

    /// Rows backed by a real ledger entry.
    pub fn entry_rows(&self) -> impl Iterator<Item = &StatementRow> + '_ {
        self.rows.iter().filter(|r| r.kind == RowKind::Entry)
    }

    /// Title the statement with the account's code and name.
    pub fn with_account(mut self, label: Option<AccountLabel>) -> Self {
        self.account = label;
        self
    }

    /// Header text, e.g. `Account Ledger: Cash in hand`.
    pub fn title(&self) -> String {
        match &self.account {
            Some(label) => format!("Account Ledger: {}", label.name),
            None => "Account Ledger: Unknown Account".to_string(),
        }
    }
}

/// Build a statement from the entries of one account and date range.
///
/// `balance_before_hint` applies only when the first entry after ordering does
/// not carry a `previous_balance`. Fails if a total or the running balance
/// overflows `Decimal`.
pub fn build(
    mut entries: Vec<LedgerEntry>,
    balance_before_hint: Option<Decimal>,
) -> DomainResult<Statement> {
    sort_entries(&mut entries);

    let balance_before = entries
        .first()
        .and_then(|e| e.previous_balance)
        .or(balance_before_hint)
        .unwrap_or(Decimal::ZERO);

    let mut rows = Vec::with_capacity(entries.len() + 1);
    if balance_before != Decimal::ZERO {
        rows.push(StatementRow::brought_forward(balance_before));
    }

    let mut running = balance_before;
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    for entry in &entries {
        let total = match entry.transaction_type {
            TransactionType::Debit => &mut total_debit,
            TransactionType::Credit => &mut total_credit,
        };
        *total = total.checked_add(entry.amount).ok_or_else(|| out_of_range(entry))?;
        running = running
            .checked_add(entry.signed_amount())
            .ok_or_else(|| out_of_range(entry))?;
        rows.push(StatementRow::entry(entry, running));
    }

    Ok(Statement {
        account: None,
        balance_before,
        rows,
        total_debit,
        total_credit,
        closing_balance: running,
    })
}

fn out_of_range(entry: &LedgerEntry) -> DomainError {
    DomainError::invariant(format!(
        "statement totals leave the representable range at entry {}",
        entry.id
    ))
}

/// A fully specified ledger query: account and inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRange {
    pub account_id: AccountId,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl StatementRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// Ledger query parameters as collected; every part is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatementRequest {
    pub account_id: Option<AccountId>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl StatementRequest {
    pub fn new(account_id: AccountId, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            account_id: Some(account_id),
            from: Some(from),
            to: Some(to),
        }
    }

    /// Reject the request unless account, start and end are present and ordered.
    pub fn validate(&self) -> DomainResult<StatementRange> {
        let account_id = self
            .account_id
            .ok_or_else(|| DomainError::validation("ledger query requires an account"))?;
        let from = self
            .from
            .ok_or_else(|| DomainError::validation("ledger query requires a start date"))?;
        let to = self
            .to
            .ok_or_else(|| DomainError::validation("ledger query requires an end date"))?;
        if from > to {
            return Err(DomainError::validation(format!(
                "start date {} is after end date {}",
                dates::format_wire_date(from),
                dates::format_wire_date(to)
            )));
        }
        Ok(StatementRange {
            account_id,
            from,
            to,
        })
    }
}

/// The account-ledger form: account field plus a `dd-mm-yyyy` range.
#[derive(Debug, Clone)]
pub struct StatementForm {
    account: AccountSelection,
    from: NaiveDate,
    to: NaiveDate,
}

impl StatementForm {
    /// Defaults to the month ending `today`.
    pub fn new(today: NaiveDate) -> Self {
        let from = today.checked_sub_months(Months::new(1)).unwrap_or(today);
        Self {
            account: AccountSelection::new(AccountScope::Any),
            from,
            to: today,
        }
    }

    pub fn account(&self) -> &AccountSelection {
        &self.account
    }

    pub fn account_mut(&mut self) -> &mut AccountSelection {
        &mut self.account
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Set the start date from `dd-mm-yyyy`; invalid text keeps the old value.
    pub fn set_from_text(&mut self, text: &str) -> DomainResult<()> {
        self.from = dates::parse_wire_date(text)?;
        Ok(())
    }

    /// Set the end date from `dd-mm-yyyy`; invalid text keeps the old value.
    pub fn set_to_text(&mut self, text: &str) -> DomainResult<()> {
        self.to = dates::parse_wire_date(text)?;
        Ok(())
    }

    /// The request to issue, if the selected account still exists in `directory`.
    pub fn request(&self, directory: &AccountDirectory) -> DomainResult<StatementRequest> {
        let account_id = self
            .account
            .account_id()
            .filter(|id| directory.resolve_by_id(id).is_some())
            .ok_or_else(|| DomainError::validation("select an account to generate a ledger"))?;
        let request = StatementRequest::new(account_id, self.from, self.to);
        request.validate()?;
        Ok(request)
    }
}
