//! End-to-end tests for the voucher and statement pipeline.
//!
//! Flow: VoucherSession → InMemoryLedgerStore → StatementService
//!
//! Verifies:
//! - Posted vouchers move account balances by the right polarity
//! - Statements carry balances forward across the requested range
//! - An inactive session blocks every collaborator call

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use ledgerdesk_accounting::{
        Account, AccountType, RowKind, StatementForm, TransactionType, VoucherType,
        BALANCE_BROUGHT_FORWARD_LABEL, OPENING_BALANCE_LABEL,
    };
    use ledgerdesk_auth::{AccessToken, SessionContext, SessionError};
    use ledgerdesk_core::{AccountId, UserId};

    use crate::error::CollaboratorError;
    use crate::memory::InMemoryLedgerStore;
    use crate::ports::AccountDirectorySource;
    use crate::session::{SubmitError, VoucherSession};
    use crate::statement_service::StatementService;

    const CASH: AccountId = AccountId::from_u128(0x10);
    const BANK: AccountId = AccountId::from_u128(0x11);
    const RENT: AccountId = AccountId::from_u128(0x50);
    const POWER: AccountId = AccountId::from_u128(0x51);
    const SALES: AccountId = AccountId::from_u128(0x40);

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn login() -> SessionContext {
        SessionContext::login(
            UserId::from_u128(1),
            AccessToken::new("integration"),
            Utc::now(),
            Duration::hours(8),
        )
        .unwrap()
    }

    fn seeded_store() -> Arc<InMemoryLedgerStore> {
        let store = InMemoryLedgerStore::new();
        let opened = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let mut cash = Account::new(CASH, "1000", "Cash in hand", AccountType::Cash);
        cash.opening_balance = Decimal::from(1000);
        for account in [
            cash,
            Account::new(BANK, "1100", "Main bank", AccountType::Bank),
            Account::new(RENT, "5000", "Rent", AccountType::Expense),
            Account::new(POWER, "5100", "Electricity", AccountType::Expense),
            Account::new(SALES, "4000", "Sales", AccountType::Income),
        ] {
            store.open_account(account, opened).unwrap();
        }
        Arc::new(store)
    }

    fn add_line(voucher: &mut VoucherSession<Arc<InMemoryLedgerStore>>, code: &str, amount: &str, description: &str) {
        let directory = voucher.directory().clone();
        let current = voucher.builder_mut().current_mut();
        assert!(current.account_mut().type_code(&directory, code));
        current.set_amount_text(amount);
        current.set_description(description);
        voucher.builder_mut().add_entry().unwrap();
    }

    async fn post_january(store: &Arc<InMemoryLedgerStore>, session: &SessionContext) {
        let mut payment = VoucherSession::new(store.clone(), VoucherType::Payment);
        payment.load_directory(session).await.unwrap();
        payment.load_voucher_number(session).await.unwrap();
        add_line(&mut payment, "5000", "300", "January rent");
        add_line(&mut payment, "5100", "200", "Power bill");
        let receipt = payment.submit(session, day(10), day(31)).await.unwrap();
        assert_eq!(receipt.voucher_no, 1);

        let mut sale = VoucherSession::new(store.clone(), VoucherType::Receipt);
        sale.load_directory(session).await.unwrap();
        add_line(&mut sale, "4000", "1,250", "Counter sales");
        let receipt = sale.submit(session, day(12), day(31)).await.unwrap();
        assert_eq!(receipt.voucher_type, VoucherType::Receipt);
        assert_eq!(receipt.voucher_no, 1);
    }

    #[tokio::test]
    async fn vouchers_move_balances_by_type_polarity() {
        let store = seeded_store();
        let session = login();
        post_january(&store, &session).await;

        assert_eq!(store.account(&CASH).unwrap().current_balance, Decimal::from(1750));
        assert_eq!(store.account(&RENT).unwrap().current_balance, Decimal::from(300));
        assert_eq!(store.account(&POWER).unwrap().current_balance, Decimal::from(200));
        assert_eq!(store.account(&SALES).unwrap().current_balance, Decimal::from(-1250));

        let sales_leg = store
            .entries()
            .unwrap()
            .into_iter()
            .find(|e| e.account_id == SALES)
            .unwrap();
        assert_eq!(sales_leg.transaction_type, TransactionType::Credit);

        let debits: Decimal = store
            .entries()
            .unwrap()
            .iter()
            .filter(|e| e.voucher_id.is_some() && e.transaction_type == TransactionType::Debit)
            .map(|e| e.amount)
            .sum();
        let credits: Decimal = store
            .entries()
            .unwrap()
            .iter()
            .filter(|e| e.voucher_id.is_some() && e.transaction_type == TransactionType::Credit)
            .map(|e| e.amount)
            .sum();
        assert_eq!(debits, credits);
    }

    #[tokio::test]
    async fn full_month_statement_starts_with_opening_balance() {
        let store = seeded_store();
        let session = login();
        post_january(&store, &session).await;

        let directory = ledgerdesk_accounting::AccountDirectory::new(store.load_accounts(&session).await.unwrap());
        let mut form = StatementForm::new(day(31));
        assert!(form.account_mut().type_code(&directory, "1000"));
        form.set_from_text("01-01-2024").unwrap();
        let request = form.request(&directory).unwrap();

        let service = StatementService::new(store.clone());
        let statement = service.statement(&session, &request, &directory).await.unwrap();

        assert_eq!(statement.title(), "Account Ledger: Cash in hand");
        assert_eq!(statement.balance_before, Decimal::ZERO);
        assert_eq!(statement.rows.len(), 4);
        assert_eq!(statement.rows[0].description, OPENING_BALANCE_LABEL);

        let balances: Vec<String> = statement.rows.iter().map(|r| r.balance_display()).collect();
        assert_eq!(balances, ["1,000 Dr.", "700 Dr.", "500 Dr.", "1,750 Dr."]);
        assert_eq!(statement.total_debit, Decimal::from(2250));
        assert_eq!(statement.total_credit, Decimal::from(500));
        assert_eq!(statement.closing_balance, Decimal::from(1750));
        assert_eq!(statement.rows[1].date_display(), "10/01/2024");
        assert_eq!(statement.rows[1].credit_display(), "300");
        assert_eq!(statement.rows[1].debit_display(), "-");
    }

    #[tokio::test]
    async fn mid_month_statement_carries_balance_forward() {
        let store = seeded_store();
        let session = login();
        post_january(&store, &session).await;

        let directory = ledgerdesk_accounting::AccountDirectory::new(store.load_accounts(&session).await.unwrap());
        let request = ledgerdesk_accounting::StatementRequest::new(CASH, day(11), day(31));
        let statement = StatementService::new(store.clone())
            .statement(&session, &request, &directory)
            .await
            .unwrap();

        assert_eq!(statement.balance_before, Decimal::from(500));
        assert_eq!(statement.rows.len(), 2);
        assert_eq!(statement.rows[0].kind, RowKind::BroughtForward);
        assert_eq!(statement.rows[0].description, BALANCE_BROUGHT_FORWARD_LABEL);
        assert_eq!(statement.rows[0].date_display(), "-");
        assert_eq!(statement.rows[1].debit_display(), "1,250");
        assert_eq!(statement.closing_label().to_string(), "1,750 Dr.");
    }

    #[tokio::test]
    async fn credit_natured_account_statement() {
        let store = seeded_store();
        let session = login();
        post_january(&store, &session).await;

        let directory = ledgerdesk_accounting::AccountDirectory::new(store.load_accounts(&session).await.unwrap());
        let request = ledgerdesk_accounting::StatementRequest::new(SALES, day(1), day(31));
        let statement = StatementService::new(store.clone())
            .statement(&session, &request, &directory)
            .await
            .unwrap();

        assert_eq!(statement.entry_rows().count(), 1);
        assert_eq!(statement.closing_label().to_string(), "1,250 Cr.");
    }

    #[tokio::test]
    async fn logged_out_session_blocks_submission_and_queries() {
        let store = seeded_store();
        let mut session = login();

        let mut payment = VoucherSession::new(store.clone(), VoucherType::Payment);
        payment.load_directory(&session).await.unwrap();
        add_line(&mut payment, "5000", "300", "January rent");

        session.invalidate();

        let err = payment.submit(&session, day(10), day(31)).await.unwrap_err();
        assert_eq!(
            err,
            SubmitError::Collaborator(CollaboratorError::Session(SessionError::Invalidated))
        );
        assert_eq!(payment.builder().pair_count(), 1);
        assert_eq!(store.entries().unwrap().len(), 1);

        let request = ledgerdesk_accounting::StatementRequest::new(CASH, day(1), day(31));
        let err = StatementService::new(store.clone())
            .statement(&session, &request, payment.directory())
            .await
            .unwrap_err();
        assert!(matches!(err, CollaboratorError::Session(_)));
    }

    #[tokio::test]
    async fn edited_and_deleted_lines_post_only_surviving_pairs() {
        let store = seeded_store();
        let session = login();

        let mut payment = VoucherSession::new(store.clone(), VoucherType::Payment);
        payment.load_directory(&session).await.unwrap();
        add_line(&mut payment, "5000", "300", "January rent");
        add_line(&mut payment, "5100", "200", "Power bill");

        payment.builder_mut().begin_edit(0).unwrap();
        payment.builder_mut().current_mut().set_amount_text("350");
        payment.builder_mut().commit_edit().unwrap();
        payment.builder_mut().delete_entry(1).unwrap();

        payment.submit(&session, day(10), day(31)).await.unwrap();

        assert_eq!(store.account(&RENT).unwrap().current_balance, Decimal::from(350));
        assert_eq!(store.account(&POWER).unwrap().current_balance, Decimal::ZERO);
        assert_eq!(store.account(&CASH).unwrap().current_balance, Decimal::from(650));
    }
}
