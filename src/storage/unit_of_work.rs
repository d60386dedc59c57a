use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::{AccountId, Cents};

use super::store::format_timestamp;

/// An open database transaction. Everything done through it becomes visible
/// on `commit` and nothing does on `rollback` (or on drop).
pub struct UnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl UnitOfWork {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Read an account's balance and take the database writer lock.
    ///
    /// The read is a no-op `UPDATE ... RETURNING`, so the lock is acquired by
    /// the first statement of the unit. A concurrent unit touching the same
    /// account waits for this one to finish and then sees its committed
    /// balance instead of a stale snapshot.
    pub async fn read_balance(&mut self, account_id: AccountId) -> Result<Option<Cents>> {
        let row = sqlx::query("UPDATE accounts SET balance = balance WHERE id = ? RETURNING balance")
            .bind(account_id)
            .fetch_optional(&mut *self.tx)
            .await
            .context("Failed to read balance")?;

        Ok(row.map(|row| row.get("balance")))
    }

    /// Compare-and-set the balance. Returns the number of rows affected,
    /// which is zero if the account is gone or its balance is no longer
    /// `expected`.
    pub async fn conditional_update_balance(
        &mut self,
        account_id: AccountId,
        expected: Cents,
        new_balance: Cents,
    ) -> Result<u64> {
        let result = sqlx::query("UPDATE accounts SET balance = ? WHERE id = ? AND balance = ?")
            .bind(new_balance)
            .bind(account_id)
            .bind(expected)
            .execute(&mut *self.tx)
            .await
            .context("Failed to update balance")?;

        Ok(result.rows_affected())
    }

    /// Append a ledger record. Returns the number of rows inserted.
    pub async fn insert_transaction(
        &mut self,
        account_id: AccountId,
        amount: Cents,
        reason: &str,
        date: DateTime<Utc>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (account_id, amount, operation, date)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .bind(reason)
        .bind(format_timestamp(date))
        .execute(&mut *self.tx)
        .await
        .context("Failed to insert transaction")?;

        Ok(result.rows_affected())
    }

    pub async fn commit(self) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit database transaction")
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx
            .rollback()
            .await
            .context("Failed to roll back database transaction")
    }
}
