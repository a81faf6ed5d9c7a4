//! Amount input parsing and signed balance display.
//!
//! Balances are signed with a debit-positive convention: a non-negative value is
//! debit-natured ("Dr."), a negative value is credit-natured ("Cr.").

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerdesk_core::{DomainError, DomainResult};

/// Strip everything but ASCII digits from a typed amount.
pub fn sanitize_amount_input(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Parse digits-only amount text into a strictly positive amount.
pub fn parse_amount(text: &str) -> DomainResult<Decimal> {
    let digits = sanitize_amount_input(text);
    if digits.is_empty() {
        return Err(DomainError::validation("amount is required"));
    }
    let amount = Decimal::from_str(&digits).map_err(|_| amount_too_large())?;
    if amount <= Decimal::ZERO {
        return Err(DomainError::validation("amount must be positive"));
    }
    Ok(amount)
}

pub(crate) fn amount_too_large() -> DomainError {
    DomainError::validation("amount is too large")
}

/// Sum of `amounts`, or `None` if it leaves the representable range.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// Render a decimal with `,` thousands separators (`-1234567.5` -> `-1,234,567.5`).
pub fn group_thousands(value: Decimal) -> String {
    let text = value.abs().normalize().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if value < Decimal::ZERO {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Display side of a signed balance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceSide {
    #[serde(rename = "Dr.")]
    Dr,
    #[serde(rename = "Cr.")]
    Cr,
}

impl BalanceSide {
    /// Total mapping: zero is debit-natured.
    pub fn of(value: Decimal) -> Self {
        if value >= Decimal::ZERO {
            BalanceSide::Dr
        } else {
            BalanceSide::Cr
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceSide::Dr => "Dr.",
            BalanceSide::Cr => "Cr.",
        }
    }
}

impl fmt::Display for BalanceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed balance split into magnitude and side, e.g. `1,100 Dr.`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLabel {
    pub magnitude: Decimal,
    pub side: BalanceSide,
}

impl BalanceLabel {
    pub fn from_signed(value: Decimal) -> Self {
        Self {
            magnitude: value.abs(),
            side: BalanceSide::of(value),
        }
    }

    /// Back to the signed representation.
    pub fn signed(&self) -> Decimal {
        match self.side {
            BalanceSide::Dr => self.magnitude,
            BalanceSide::Cr => -self.magnitude,
        }
    }
}

impl From<Decimal> for BalanceLabel {
    fn from(value: Decimal) -> Self {
        Self::from_signed(value)
    }
}

impl fmt::Display for BalanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", group_thousands(self.magnitude), self.side)
    }
}
