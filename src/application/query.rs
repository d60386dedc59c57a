use crate::domain::{
    AccountId, Cents, MAX_LIMIT, PageRequest, TransactionRecord, is_valid_account_id,
};
use crate::storage::LedgerStore;

use super::AppError;

/// Read-only access to balances and transaction history.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: LedgerStore,
}

impl QueryService {
    pub fn new(store: LedgerStore) -> Self {
        Self { store }
    }

    /// Committed balance of an account, in cents.
    pub async fn get_balance(&self, account_id: AccountId) -> Result<Cents, AppError> {
        check_account_id(account_id)?;
        self.store
            .get_balance(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))
    }

    /// One page of an account's history. An account without records gives an
    /// empty page; an unknown account is an error.
    pub async fn get_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<Vec<TransactionRecord>, AppError> {
        check_account_id(account_id)?;
        validate_page(&page)?;

        if !self.store.account_exists(account_id).await? {
            return Err(AppError::AccountNotFound(account_id));
        }

        Ok(self
            .store
            .query_transactions(account_id, page.sort, page.limit, page.offset())
            .await?)
    }

    /// The full history of an account in insertion order.
    pub async fn get_all_transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, AppError> {
        check_account_id(account_id)?;
        if !self.store.account_exists(account_id).await? {
            return Err(AppError::AccountNotFound(account_id));
        }
        Ok(self.store.list_transactions(account_id).await?)
    }
}

fn check_account_id(account_id: AccountId) -> Result<(), AppError> {
    if is_valid_account_id(account_id) {
        Ok(())
    } else {
        Err(AppError::InvalidAccountId(account_id))
    }
}

fn validate_page(page: &PageRequest) -> Result<(), AppError> {
    if page.page == 0 {
        return Err(AppError::InvalidPage("page numbers start at 1".to_string()));
    }
    if page.limit == 0 || page.limit > MAX_LIMIT {
        return Err(AppError::InvalidPage(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {}",
            page.limit
        )));
    }
    Ok(())
}
