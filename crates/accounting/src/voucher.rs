//! Voucher composition: single-sided input in, balanced entry pairs out.
//!
//! A voucher line is entered once (general account, amount, description) and
//! becomes an [`EntryPair`]: one leg against the general account and one leg
//! against the voucher-side cash/bank account, equal amounts, opposite types.
//! Pairs are stored as explicit structures and addressed by pair index only;
//! legs are reachable through their pair, never by a flat offset.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerdesk_core::{AccountId, DomainError, DomainResult};

use crate::account::AccountScope;
use crate::dates;
use crate::money::{self, group_thousands};
use crate::selection::AccountSelection;

/// Leg direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn opposite(self) -> Self {
        match self {
            TransactionType::Debit => TransactionType::Credit,
            TransactionType::Credit => TransactionType::Debit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Debit => "DEBIT",
            TransactionType::Credit => "CREDIT",
        }
    }

    /// Effect of `amount` on a debit-positive balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionType::Debit => amount,
            TransactionType::Credit => -amount,
        }
    }
}

/// Voucher kind. Fixes the polarity of every pair in the voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    /// Cash/bank pays out: general account debited, voucher account credited.
    Payment,
    /// Cash/bank receives: general account credited, voucher account debited.
    Receipt,
}

impl VoucherType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherType::Payment => "PAYMENT",
            VoucherType::Receipt => "RECEIPT",
        }
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            VoucherType::Payment => "Payment Voucher",
            VoucherType::Receipt => "Receipt Voucher",
        }
    }

    /// Direction of the general-account leg.
    pub fn general_side(&self) -> TransactionType {
        match self {
            VoucherType::Payment => TransactionType::Debit,
            VoucherType::Receipt => TransactionType::Credit,
        }
    }

    /// Direction of the cash/bank leg.
    pub fn voucher_side(&self) -> TransactionType {
        self.general_side().opposite()
    }
}

impl core::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One leg of a voucher line, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryDraft {
    pub account_id: AccountId,
    pub account_code: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub description: String,
    /// Account of the opposite leg (display only).
    pub pair_account_id: AccountId,
}

/// Two legs of equal amount and opposite direction against different accounts.
///
/// Fields are private: a pair can only be built balanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPair {
    voucher_leg: LedgerEntryDraft,
    general_leg: LedgerEntryDraft,
}

impl EntryPair {
    fn build(
        voucher_type: VoucherType,
        general: (AccountId, &str),
        voucher: (AccountId, &str),
        amount: Decimal,
        description: &str,
    ) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("amount must be positive"));
        }
        if general.0 == voucher.0 {
            return Err(DomainError::validation(
                "general account and voucher account must differ",
            ));
        }

        let general_leg = LedgerEntryDraft {
            account_id: general.0,
            account_code: general.1.to_string(),
            amount,
            transaction_type: voucher_type.general_side(),
            description: description.to_string(),
            pair_account_id: voucher.0,
        };
        let voucher_leg = LedgerEntryDraft {
            account_id: voucher.0,
            account_code: voucher.1.to_string(),
            amount,
            transaction_type: voucher_type.voucher_side(),
            description: description.to_string(),
            pair_account_id: general.0,
        };

        Ok(Self {
            voucher_leg,
            general_leg,
        })
    }

    pub fn voucher_leg(&self) -> &LedgerEntryDraft {
        &self.voucher_leg
    }

    pub fn general_leg(&self) -> &LedgerEntryDraft {
        &self.general_leg
    }

    pub fn amount(&self) -> Decimal {
        self.general_leg.amount
    }

    pub fn description(&self) -> &str {
        &self.general_leg.description
    }

    pub fn debit_leg(&self) -> &LedgerEntryDraft {
        if self.general_leg.transaction_type == TransactionType::Debit {
            &self.general_leg
        } else {
            &self.voucher_leg
        }
    }

    pub fn credit_leg(&self) -> &LedgerEntryDraft {
        if self.general_leg.transaction_type == TransactionType::Credit {
            &self.general_leg
        } else {
            &self.voucher_leg
        }
    }

    /// Both legs in submission order: voucher leg, then general leg.
    pub fn legs(&self) -> [&LedgerEntryDraft; 2] {
        [&self.voucher_leg, &self.general_leg]
    }
}

/// The pending single-leg input: general account, amount text, description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentEntry {
    account: AccountSelection,
    amount_text: String,
    description: String,
}

impl Default for CurrentEntry {
    fn default() -> Self {
        Self {
            account: AccountSelection::new(AccountScope::Any),
            amount_text: String::new(),
            description: String::new(),
        }
    }
}

impl CurrentEntry {
    pub fn account(&self) -> &AccountSelection {
        &self.account
    }

    pub fn account_mut(&mut self) -> &mut AccountSelection {
        &mut self.account
    }

    /// Store typed amount text; anything but digits is dropped.
    pub fn set_amount_text(&mut self, raw: &str) {
        self.amount_text = money::sanitize_amount_input(raw);
    }

    pub fn amount_text(&self) -> &str {
        &self.amount_text
    }

    /// Amount text with thousands separators, empty while nothing is typed.
    pub fn amount_display(&self) -> String {
        match money::parse_amount(&self.amount_text) {
            Ok(amount) => group_thousands(amount),
            Err(_) => self.amount_text.clone(),
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> DomainResult<Decimal> {
        money::parse_amount(&self.amount_text)
    }

    pub fn clear(&mut self) {
        self.account.clear();
        self.amount_text.clear();
        self.description.clear();
    }
}

/// Builder state: composing new lines or editing a committed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderState {
    #[default]
    Composing,
    EditingAt(usize),
}

/// Composer for one voucher in one session.
#[derive(Debug, Clone)]
pub struct VoucherEntryBuilder {
    voucher_type: VoucherType,
    description: String,
    voucher_account: AccountSelection,
    current: CurrentEntry,
    pairs: Vec<EntryPair>,
    state: BuilderState,
}

impl VoucherEntryBuilder {
    pub fn new(voucher_type: VoucherType) -> Self {
        Self {
            voucher_type,
            description: voucher_type.default_description().to_string(),
            voucher_account: AccountSelection::new(AccountScope::CashOrBank),
            current: CurrentEntry::default(),
            pairs: Vec::new(),
            state: BuilderState::Composing,
        }
    }

    pub fn voucher_type(&self) -> VoucherType {
        self.voucher_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn voucher_account(&self) -> &AccountSelection {
        &self.voucher_account
    }

    pub fn voucher_account_mut(&mut self) -> &mut AccountSelection {
        &mut self.voucher_account
    }

    pub fn current(&self) -> &CurrentEntry {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut CurrentEntry {
        &mut self.current
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn pairs(&self) -> &[EntryPair] {
        &self.pairs
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Number of raw legs; always even.
    pub fn leg_count(&self) -> usize {
        self.pairs.len() * 2
    }

    /// General-account legs in pair order (the entries table).
    pub fn general_entries(&self) -> impl Iterator<Item = &LedgerEntryDraft> + '_ {
        self.pairs.iter().map(EntryPair::general_leg)
    }

    /// Sum of the general-side amounts.
    ///
    /// `add_entry` and `commit_edit` refuse lines that would push this past
    /// `Decimal::MAX`, so the saturation never shows in practice.
    pub fn total_amount(&self) -> Decimal {
        money::checked_sum(self.pairs.iter().map(EntryPair::amount)).unwrap_or(Decimal::MAX)
    }

    /// Whether `add_entry` / `commit_edit` would currently succeed.
    pub fn can_commit_line(&self) -> bool {
        let replacing = match self.state {
            BuilderState::Composing => None,
            BuilderState::EditingAt(idx) => Some(idx),
        };
        self.build_line(replacing).is_ok()
    }

    /// Commit the pending input as a new pair.
    ///
    /// On error nothing changes, so callers that disabled the action until the
    /// input is valid may ignore the result.
    pub fn add_entry(&mut self) -> DomainResult<()> {
        if let BuilderState::EditingAt(idx) = self.state {
            return Err(DomainError::conflict(format!(
                "pair {idx} is being edited; commit or cancel the edit first"
            )));
        }
        let pair = self.build_line(None)?;
        tracing::debug!(
            voucher_type = %self.voucher_type,
            amount = %pair.amount(),
            pair_index = self.pairs.len(),
            "added voucher line"
        );
        self.pairs.push(pair);
        self.current.clear();
        Ok(())
    }

    /// Load the general leg of pair `pair_index` into the pending input.
    pub fn begin_edit(&mut self, pair_index: usize) -> DomainResult<()> {
        let pair = self.pair_at(pair_index)?;
        let leg = pair.general_leg().clone();

        self.current.account.restore(leg.account_id, &leg.account_code);
        self.current.amount_text = leg.amount.normalize().to_string();
        self.current.description = leg.description;
        self.state = BuilderState::EditingAt(pair_index);
        Ok(())
    }

    /// Replace the pair being edited, in place, with the pending input.
    pub fn commit_edit(&mut self) -> DomainResult<()> {
        let BuilderState::EditingAt(idx) = self.state else {
            return Err(DomainError::conflict("no edit in progress"));
        };
        let pair = self.build_line(Some(idx))?;
        tracing::debug!(pair_index = idx, amount = %pair.amount(), "updated voucher line");
        self.pairs[idx] = pair;
        self.state = BuilderState::Composing;
        self.current.clear();
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        if matches!(self.state, BuilderState::EditingAt(_)) {
            self.state = BuilderState::Composing;
            self.current.clear();
        }
    }

    /// Remove pair `pair_index`; later pairs shift down by one.
    pub fn delete_entry(&mut self, pair_index: usize) -> DomainResult<EntryPair> {
        self.pair_at(pair_index)?;
        let removed = self.pairs.remove(pair_index);

        if let BuilderState::EditingAt(idx) = self.state {
            if idx == pair_index {
                self.state = BuilderState::Composing;
                self.current.clear();
            } else if idx > pair_index {
                self.state = BuilderState::EditingAt(idx - 1);
            }
        }

        tracing::debug!(pair_index, remaining = self.pairs.len(), "deleted voucher line");
        Ok(removed)
    }

    /// Assemble the submission. State is left untouched; call [`reset`](Self::reset)
    /// once persistence has succeeded.
    pub fn finalize(&self, date: NaiveDate) -> DomainResult<VoucherSubmission> {
        if self.pairs.is_empty() {
            return Err(DomainError::validation(
                "at least one complete entry pair (two ledger legs) is required",
            ));
        }
        if let BuilderState::EditingAt(idx) = self.state {
            return Err(DomainError::conflict(format!(
                "pair {idx} is being edited; commit or cancel the edit first"
            )));
        }

        let total_amount = money::checked_sum(self.pairs.iter().map(EntryPair::amount))
            .ok_or_else(money::amount_too_large)?;

        let voucher_acc_id = self
            .voucher_account
            .account_id()
            .or_else(|| self.pairs.last().map(|p| p.voucher_leg().account_id))
            .ok_or_else(|| DomainError::validation("select a cash or bank voucher account"))?;

        let ledger_entries = self
            .pairs
            .iter()
            .flat_map(EntryPair::legs)
            .map(SubmissionLine::from)
            .collect();

        Ok(VoucherSubmission {
            voucher_type: self.voucher_type,
            date,
            description: self.description.clone(),
            total_amount,
            voucher_acc_id,
            ledger_entries,
        })
    }

    /// Discard the draft. The voucher account stays selected.
    pub fn reset(&mut self) {
        self.pairs.clear();
        self.current.clear();
        self.state = BuilderState::Composing;
        self.description = self.voucher_type.default_description().to_string();
    }

    fn pair_at(&self, pair_index: usize) -> DomainResult<&EntryPair> {
        self.pairs.get(pair_index).ok_or_else(|| {
            DomainError::not_found(format!(
                "entry pair {pair_index} (voucher has {} pairs)",
                self.pairs.len()
            ))
        })
    }

    /// Build the pending line and check the voucher total stays representable,
    /// counting it in place of pair `replacing` when editing.
    fn build_line(&self, replacing: Option<usize>) -> DomainResult<EntryPair> {
        let pair = self.build_pair()?;
        let others = self
            .pairs
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != replacing)
            .map(|(_, p)| p.amount());
        money::checked_sum(others.chain([pair.amount()])).ok_or_else(money::amount_too_large)?;
        Ok(pair)
    }

    fn build_pair(&self) -> DomainResult<EntryPair> {
        let general_id = self
            .current
            .account
            .account_id()
            .ok_or_else(|| DomainError::validation("select an account for the entry"))?;
        let amount = self.current.amount()?;
        let voucher_id = self
            .voucher_account
            .account_id()
            .ok_or_else(|| DomainError::validation("select a cash or bank voucher account"))?;

        EntryPair::build(
            self.voucher_type,
            (general_id, self.current.account.code()),
            (voucher_id, self.voucher_account.code()),
            amount,
            &self.current.description,
        )
    }
}

/// Reject voucher dates after `today` or before 1900-01-01.
pub fn validate_voucher_date(date: NaiveDate, today: NaiveDate) -> DomainResult<()> {
    let earliest = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN);
    if date > today {
        return Err(DomainError::validation(format!(
            "voucher date {} is in the future",
            dates::format_wire_date(date)
        )));
    }
    if date < earliest {
        return Err(DomainError::validation(format!(
            "voucher date {} is before 01-01-1900",
            dates::format_wire_date(date)
        )));
    }
    Ok(())
}

/// One ledger leg as sent to the persistence boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionLine {
    pub account_id: AccountId,
    pub transaction_type: TransactionType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
}

impl From<&LedgerEntryDraft> for SubmissionLine {
    fn from(leg: &LedgerEntryDraft) -> Self {
        Self {
            account_id: leg.account_id,
            transaction_type: leg.transaction_type,
            amount: leg.amount,
            description: leg.description.clone(),
        }
    }
}

/// A finished voucher ready for the persistence boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherSubmission {
    pub voucher_type: VoucherType,
    #[serde(with = "crate::dates::wire_date")]
    pub date: NaiveDate,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub voucher_acc_id: AccountId,
    pub ledger_entries: Vec<SubmissionLine>,
}

impl VoucherSubmission {
    /// `None` when the debit sum is not representable.
    pub fn debit_total(&self) -> Option<Decimal> {
        self.side_total(TransactionType::Debit)
    }

    /// `None` when the credit sum is not representable.
    pub fn credit_total(&self) -> Option<Decimal> {
        self.side_total(TransactionType::Credit)
    }

    /// Debits equal credits. An overflowing side is never balanced.
    pub fn is_balanced(&self) -> bool {
        match (self.debit_total(), self.credit_total()) {
            (Some(debit), Some(credit)) => debit == credit,
            _ => false,
        }
    }

    fn side_total(&self, side: TransactionType) -> Option<Decimal> {
        money::checked_sum(
            self.ledger_entries
                .iter()
                .filter(|l| l.transaction_type == side)
                .map(|l| l.amount),
        )
    }
}
