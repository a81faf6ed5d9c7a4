//! A single account field: typed code, resolved id, adopted balance.
//!
//! The field can be driven three ways: typing a code, picking an account by id,
//! or adopting a default once the directory has loaded. Default adoption is a
//! one-shot: it never fires after the user has interacted with the field, and
//! never fires twice in a session, so a late or repeated directory load cannot
//! clobber an in-progress selection.

use rust_decimal::Decimal;

use ledgerdesk_core::AccountId;

use crate::account::{Account, AccountDirectory, AccountScope};
use crate::money::BalanceLabel;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccountSelection {
    scope: AccountScope,
    account_id: Option<AccountId>,
    code: String,
    balance: Decimal,
    touched: bool,
    default_adopted: bool,
}

impl AccountSelection {
    pub fn new(scope: AccountScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn scope(&self) -> AccountScope {
        self.scope
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn balance_label(&self) -> BalanceLabel {
        BalanceLabel::from_signed(self.balance)
    }

    pub fn is_resolved(&self) -> bool {
        self.account_id.is_some()
    }

    /// Whether the user has typed into or picked from this field.
    pub fn is_touched(&self) -> bool {
        self.touched
    }

    /// Record a typed code and resolve it within scope.
    ///
    /// A miss is not an error: the id is cleared and the typed text is kept so
    /// the user can keep typing. Returns whether the code resolved.
    pub fn type_code(&mut self, directory: &AccountDirectory, code: impl Into<String>) -> bool {
        self.touched = true;
        self.code = code.into();

        let scope = self.scope;
        match directory.resolve_by_code(&self.code).filter(|a| scope.matches(a)) {
            Some(account) => {
                self.account_id = Some(account.id);
                self.balance = account.current_balance;
                true
            }
            None => {
                self.account_id = None;
                self.balance = Decimal::ZERO;
                false
            }
        }
    }

    /// Pick an account by id, adopting its code and balance.
    ///
    /// An unknown or out-of-scope id leaves the selection unchanged.
    pub fn select_id(&mut self, directory: &AccountDirectory, id: &AccountId) -> bool {
        let scope = self.scope;
        let Some(account) = directory.resolve_by_id(id).filter(|a| scope.matches(a)) else {
            return false;
        };
        self.touched = true;
        self.adopt(account);
        true
    }

    /// Designate the first in-scope account as the selection, at most once per
    /// session and only while the field is untouched.
    pub fn adopt_default(&mut self, directory: &AccountDirectory) -> bool {
        if self.touched || self.default_adopted {
            return false;
        }
        let Some(account) = directory.first_matching(self.scope) else {
            return false;
        };
        self.default_adopted = true;
        self.adopt(account);
        tracing::debug!(account_id = %account.id, code = %account.code, "adopted default account");
        true
    }

    /// Re-read the displayed balance from a fresh snapshot.
    pub fn refresh_balance(&mut self, directory: &AccountDirectory) {
        if let Some(account) = self.account_id.and_then(|id| directory.resolve_by_id(&id)) {
            self.balance = account.current_balance;
        }
    }

    /// Clear the selected account. Session flags are kept.
    pub fn clear(&mut self) {
        self.account_id = None;
        self.code.clear();
        self.balance = Decimal::ZERO;
    }

    /// Load an id/code pair copied from a committed leg.
    pub(crate) fn restore(&mut self, id: AccountId, code: &str) {
        self.touched = true;
        self.account_id = Some(id);
        self.code = code.to_string();
        self.balance = Decimal::ZERO;
    }

    fn adopt(&mut self, account: &Account) {
        self.account_id = Some(account.id);
        self.code = account.code.clone();
        self.balance = account.current_balance;
    }
}
