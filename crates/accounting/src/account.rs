use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerdesk_core::AccountId;

use crate::money::BalanceLabel;

/// Account classification as reported by the account directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Ledger,
    Bank,
    Cash,
    Receivables,
    Payables,
    Expense,
    Income,
    Capital,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Ledger => "LEDGER",
            AccountType::Bank => "BANK",
            AccountType::Cash => "CASH",
            AccountType::Receivables => "RECEIVABLES",
            AccountType::Payables => "PAYABLES",
            AccountType::Expense => "EXPENSE",
            AccountType::Income => "INCOME",
            AccountType::Capital => "CAPITAL",
        }
    }

    /// Cash and bank accounts are the only valid voucher-side accounts.
    pub fn is_cash_or_bank(&self) -> bool {
        matches!(self, AccountType::Cash | AccountType::Bank)
    }
}

/// An account from the directory snapshot.
///
/// `current_balance` follows the debit-positive sign convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub current_balance: Decimal,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub opening_balance: Decimal,
    #[serde(default)]
    pub currency: String,
}

impl Account {
    pub fn new(
        id: AccountId,
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            id,
            code: code.into(),
            name: name.into(),
            account_type,
            current_balance: Decimal::ZERO,
            group_id: None,
            opening_balance: Decimal::ZERO,
            currency: String::new(),
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.current_balance = balance;
        self
    }

    pub fn balance_label(&self) -> BalanceLabel {
        BalanceLabel::from_signed(self.current_balance)
    }

    pub fn label(&self) -> AccountLabel {
        AccountLabel {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

/// Display identity of an account (statement headers, entry tables).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLabel {
    pub id: AccountId,
    pub code: String,
    pub name: String,
}

/// Which accounts an account field may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountScope {
    #[default]
    Any,
    /// Voucher-side accounts (CASH or BANK).
    CashOrBank,
    Only(AccountType),
}

impl AccountScope {
    pub fn matches(&self, account: &Account) -> bool {
        match self {
            AccountScope::Any => true,
            AccountScope::CashOrBank => account.account_type.is_cash_or_bank(),
            AccountScope::Only(t) => account.account_type == *t,
        }
    }
}

/// Immutable account directory snapshot with lookups by id and by code.
///
/// Directory order is preserved; it decides which account becomes the default
/// selection. Codes are assumed unique; on a duplicate the first one wins.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
    by_id: HashMap<AccountId, usize>,
    by_code: HashMap<String, usize>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        let mut by_id = HashMap::with_capacity(accounts.len());
        let mut by_code = HashMap::with_capacity(accounts.len());

        for (idx, account) in accounts.iter().enumerate() {
            by_id.entry(account.id).or_insert(idx);
            if by_code.contains_key(&account.code) {
                tracing::warn!(code = %account.code, "duplicate account code in directory snapshot");
                continue;
            }
            by_code.insert(account.code.clone(), idx);
        }

        Self {
            accounts,
            by_id,
            by_code,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Exact match on the human-entered code.
    pub fn resolve_by_code(&self, code: &str) -> Option<&Account> {
        self.by_code.get(code).map(|&idx| &self.accounts[idx])
    }

    /// Exact match on the stable identifier.
    pub fn resolve_by_id(&self, id: &AccountId) -> Option<&Account> {
        self.by_id.get(id).map(|&idx| &self.accounts[idx])
    }

    /// Accounts in directory order that fall within `scope`.
    pub fn in_scope(&self, scope: AccountScope) -> impl Iterator<Item = &Account> + '_ {
        self.accounts.iter().filter(move |a| scope.matches(a))
    }

    /// First account in directory order within `scope`.
    pub fn first_matching(&self, scope: AccountScope) -> Option<&Account> {
        self.in_scope(scope).next()
    }

    pub fn label(&self, id: &AccountId) -> Option<AccountLabel> {
        self.resolve_by_id(id).map(Account::label)
    }
}

impl FromIterator<Account> for AccountDirectory {
    fn from_iter<I: IntoIterator<Item = Account>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
