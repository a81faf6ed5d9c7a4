use ledgerdesk_accounting::{build_statement, AccountDirectory, Statement, StatementRequest};
use ledgerdesk_auth::SessionContext;

use crate::error::CollaboratorError;
use crate::ports::LedgerQuery;

/// Fetches ledger entries and renders them as an account statement.
pub struct StatementService<Q> {
    query: Q,
}

impl<Q: LedgerQuery> StatementService<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    /// Build the statement for `request`. An incomplete request is rejected
    /// before any query is issued.
    pub async fn statement(
        &self,
        session: &SessionContext,
        request: &StatementRequest,
        directory: &AccountDirectory,
    ) -> Result<Statement, CollaboratorError> {
        let range = request.validate()?;
        let entries = self.query.ledger_entries(session, request).await?;
        tracing::debug!(
            account_id = %range.account_id,
            entries = entries.len(),
            "ledger entries fetched"
        );
        Ok(build_statement(entries, None)?.with_account(directory.label(&range.account_id)))
    }
}
