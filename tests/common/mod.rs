// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use saldo::application::BalanceService;
use saldo::domain::{AccountId, Cents};
use saldo::rates::FixedRateProvider;
use saldo::storage::StoreOptions;
use tempfile::TempDir;

/// Rates used by every test service: EUR base, 1 EUR = 1.10 USD = 40.50 UAH.
pub fn test_rates() -> FixedRateProvider {
    FixedRateProvider::new("EUR")
        .with_rate("USD", Decimal::from_str("1.10").unwrap())
        .with_rate("UAH", Decimal::from_str("40.50").unwrap())
}

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(BalanceService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = BalanceService::init(
        db_path.to_str().unwrap(),
        StoreOptions::default(),
        Arc::new(test_rates()),
    )
    .await?;
    Ok((service, temp_dir))
}

/// Open an account and fund it with `balance` cents through a top-up.
pub async fn funded_account(service: &BalanceService, balance: Cents) -> Result<AccountId> {
    let account_id = service.open_account().await?;
    if balance > 0 {
        service.top_up(account_id, balance).await?;
    }
    Ok(account_id)
}

pub async fn balance_of(service: &BalanceService, account_id: AccountId) -> Cents {
    service
        .store()
        .get_balance(account_id)
        .await
        .unwrap()
        .expect("account exists")
}

pub async fn record_count(service: &BalanceService, account_id: AccountId) -> i64 {
    service
        .store()
        .count_transactions(account_id)
        .await
        .unwrap()
}

/// Make every ledger insert whose operation starts with `prefix` affect zero
/// rows, simulating a ledger write that silently does nothing.
pub async fn swallow_ledger_inserts(service: &BalanceService, prefix: &str) -> Result<()> {
    let sql = format!(
        "CREATE TRIGGER swallow_inserts BEFORE INSERT ON transactions \
         WHEN NEW.operation LIKE '{prefix}%' \
         BEGIN SELECT RAISE(IGNORE); END"
    );
    sqlx::query(&sql).execute(service.store().pool()).await?;
    Ok(())
}
