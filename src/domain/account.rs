use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Cents;

/// Accounts are addressed by the positive integer the store assigned them.
pub type AccountId = i64;

/// Returns true if `id` can name an account at all.
pub fn is_valid_account_id(id: AccountId) -> bool {
    id > 0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Current balance in cents, never negative.
    pub balance: Cents,
    pub created_at: DateTime<Utc>,
}
