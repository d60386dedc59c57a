use thiserror::Error;

use crate::domain::{AccountId, Cents, SortError, format_cents};
use crate::rates::RateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error(
        "Insufficient funds in account {account_id}: balance {}, required {}",
        format_cents(*.balance),
        format_cents(*.required)
    )]
    InsufficientFunds {
        account_id: AccountId,
        balance: Cents,
        required: Cents,
    },

    #[error("Failed to write ledger record for account {0}")]
    LedgerWriteFailed(AccountId),

    #[error("Atomic unit of work failed: {0}")]
    AtomicUnitFailed(#[source] anyhow::Error),

    #[error("Invalid sort: {0}")]
    InvalidSort(#[from] SortError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Invalid account id: {0}")]
    InvalidAccountId(AccountId),

    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("Cannot transfer from account {0} to itself")]
    SelfTransfer(AccountId),

    #[error("Exchange rate lookup failed: {0}")]
    RateLookup(#[from] RateError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// True for failures caused by the request rather than by the backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::LedgerWriteFailed(_)
                | AppError::AtomicUnitFailed(_)
                | AppError::RateLookup(_)
                | AppError::Database(_)
        )
    }
}
