//! Demo binary: seeds an in-memory ledger, posts a payment voucher and prints
//! the cash account statement.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Days, NaiveTime, Utc};
use rust_decimal::Decimal;

use ledgerdesk_accounting::{Account, AccountType, StatementForm, VoucherType};
use ledgerdesk_auth::{AccessToken, SessionContext};
use ledgerdesk_core::{AccountId, UserId};
use ledgerdesk_infra::{AppConfig, InMemoryLedgerStore, StatementService, VoucherSession};

const CASH: AccountId = AccountId::from_u128(0x1000);

fn seed_store(opened_on: chrono::NaiveDate) -> anyhow::Result<InMemoryLedgerStore> {
    let store = InMemoryLedgerStore::new();
    let opened_at = opened_on.and_time(NaiveTime::MIN).and_utc();

    let mut cash = Account::new(CASH, "1000", "Cash in hand", AccountType::Cash);
    cash.opening_balance = Decimal::from(25_000);
    cash.currency = "PKR".to_string();

    for account in [
        cash,
        Account::new(AccountId::from_u128(0x1100), "1100", "Main bank", AccountType::Bank),
        Account::new(AccountId::from_u128(0x5000), "5000", "Shop rent", AccountType::Expense),
        Account::new(AccountId::from_u128(0x5100), "5100", "Electricity", AccountType::Expense),
    ] {
        store.open_account(account, opened_at)?;
    }
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    ledgerdesk_observability::init(&config.log);
    config.warn_fallbacks();
    tracing::info!(api_base_url = %config.api_base_url, "starting ledgerdesk demo");

    let today = Utc::now().date_naive();
    let opened_on = today.checked_sub_days(Days::new(7)).unwrap_or(today);
    let store = Arc::new(seed_store(opened_on)?);

    let mut session = SessionContext::login(
        UserId::new(),
        AccessToken::new("demo-token"),
        Utc::now(),
        config.session_ttl,
    )
    .context("login failed")?;

    let mut voucher = VoucherSession::new(store.clone(), VoucherType::Payment);
    voucher.load_directory(&session).await?;
    let number = voucher.load_voucher_number(&session).await?;

    let directory = voucher.directory().clone();
    for (code, amount, description) in [("5000", "45,000", "Monthly rent"), ("5100", "3,200", "Power bill")] {
        let current = voucher.builder_mut().current_mut();
        current.account_mut().type_code(&directory, code);
        current.set_amount_text(amount);
        current.set_description(description);
        voucher.builder_mut().add_entry()?;
    }

    let draft = voucher.builder().finalize(today)?;
    println!("Payment voucher #{number}");
    println!("{}", serde_json::to_string_pretty(&draft)?);

    let receipt = voucher
        .submit(&session, today, today)
        .await
        .context("voucher submission failed")?;
    println!("Persisted voucher {} as number {}", receipt.voucher_id, receipt.voucher_no);

    let mut form = StatementForm::new(today);
    form.account_mut().select_id(voucher.directory(), &CASH);
    let request = form.request(voucher.directory())?;
    let statement = StatementService::new(store.clone())
        .statement(&session, &request, voucher.directory())
        .await?;

    println!();
    println!("{}", statement.title());
    println!("{:<12} {:<20} {:>10} {:>10} {:>14}", "Date", "Description", "Debit", "Credit", "Balance");
    for row in &statement.rows {
        println!(
            "{:<12} {:<20} {:>10} {:>10} {:>14}",
            row.date_display(),
            row.description,
            row.debit_display(),
            row.credit_display(),
            row.balance_display()
        );
    }
    println!("Closing balance: {}", statement.closing_label());

    session.invalidate();
    Ok(())
}
