use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::domain::{Account, AccountId, Cents, Sort, TransactionRecord};

use super::{MIGRATION_001_INITIAL, UnitOfWork};

/// Connection tuning for the ledger database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub max_connections: u32,
    /// How long a unit of work waits for the writer lock before giving up.
    pub busy_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// The transactional backend holding account balances and ledger records.
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    pool: SqlitePool,
}

impl LedgerStore {
    /// Create a store over an existing SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the SQLite database at `path`, creating the file if needed.
    pub async fn connect(path: &str, options: StoreOptions) -> Result<Self> {
        let connect_options = SqliteConnectOptions::from_str(&format!("sqlite:{path}"))
            .with_context(|| format!("Invalid database path: {path}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(options.busy_timeout)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(options.max_connections)
            .connect_with(connect_options)
            .await
            .context("Failed to connect to database")?;

        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(path: &str, options: StoreOptions) -> Result<Self> {
        let store = Self::connect(path, options).await?;
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a new atomic unit of work.
    pub async fn begin(&self) -> Result<UnitOfWork> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin database transaction")?;
        Ok(UnitOfWork::new(tx))
    }

    // ========================
    // Accounts
    // ========================

    /// Create an account with a zero balance. Funding goes through the ledger.
    pub async fn create_account(&self) -> Result<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (balance, created_at)
            VALUES (0, ?)
            RETURNING id, balance, created_at
            "#,
        )
        .bind(format_timestamp(Utc::now()))
        .fetch_one(&self.pool)
        .await
        .context("Failed to create account")?;

        Self::row_to_account(&row)
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, balance, created_at FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch account")?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    /// Read the committed balance of an account without locking it.
    pub async fn get_balance(&self, id: AccountId) -> Result<Option<Cents>> {
        let row = sqlx::query("SELECT balance FROM accounts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch balance")?;

        Ok(row.map(|row| row.get("balance")))
    }

    pub async fn account_exists(&self, id: AccountId) -> Result<bool> {
        Ok(self.get_balance(id).await?.is_some())
    }

    // ========================
    // Ledger records
    // ========================

    /// One page of an account's records. The sort is an allow-listed enum,
    /// so the only text spliced into the statement is a static `ORDER BY`.
    pub async fn query_transactions(
        &self,
        account_id: AccountId,
        sort: Sort,
        limit: u32,
        offset: i64,
    ) -> Result<Vec<TransactionRecord>> {
        let query = format!(
            "SELECT id, account_id, amount, operation, date FROM transactions WHERE account_id = ? ORDER BY {} LIMIT ? OFFSET ?",
            sort.order_by()
        );

        let rows = sqlx::query(&query)
            .bind(account_id)
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to query transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    /// Every record of an account in insertion order.
    pub async fn list_transactions(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, amount, operation, date
            FROM transactions
            WHERE account_id = ?
            ORDER BY id
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    pub async fn count_transactions(&self, account_id: AccountId) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM transactions WHERE account_id = ?")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count transactions")?;

        Ok(row.get("total"))
    }

    fn row_to_account(row: &SqliteRow) -> Result<Account> {
        let created_at: String = row.get("created_at");
        Ok(Account {
            id: row.get("id"),
            balance: row.get("balance"),
            created_at: parse_timestamp(&created_at).context("Invalid created_at timestamp")?,
        })
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<TransactionRecord> {
        let date: String = row.get("date");
        Ok(TransactionRecord {
            id: row.get("id"),
            account_id: row.get("account_id"),
            amount: row.get("amount"),
            operation: row.get("operation"),
            date: parse_timestamp(&date).context("Invalid transaction date")?,
        })
    }
}

/// Timestamps are stored as fixed-width UTC RFC 3339 so that text ordering
/// matches chronological ordering.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
