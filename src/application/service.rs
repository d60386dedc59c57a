use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{
    AccountId, Cents, Channel, PageRequest, TransactionRecord, cents_to_decimal,
};
use crate::rates::{RateProvider, normalize_currency};
use crate::storage::{LedgerStore, StoreOptions};

use super::{AppError, BalanceMutator, Mutation, QueryService, TransferOrchestrator};

/// Application service providing the account operations.
/// This is the interface the HTTP layer and the CLI talk to.
#[derive(Clone)]
pub struct BalanceService {
    store: LedgerStore,
    mutator: BalanceMutator,
    transfers: TransferOrchestrator,
    queries: QueryService,
    rates: Arc<dyn RateProvider>,
}

/// A balance expressed in some currency, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceView {
    pub account_id: AccountId,
    pub balance: Decimal,
    pub currency: String,
}

impl BalanceService {
    /// Wire the components over `store`.
    pub fn new(store: LedgerStore, rates: Arc<dyn RateProvider>) -> Self {
        let mutator = BalanceMutator::new(store.clone());
        let transfers = TransferOrchestrator::new(store.clone(), mutator.clone());
        let queries = QueryService::new(store.clone());
        Self {
            store,
            mutator,
            transfers,
            queries,
            rates,
        }
    }

    /// Open (and migrate) the database at `path`.
    pub async fn init(
        path: &str,
        options: StoreOptions,
        rates: Arc<dyn RateProvider>,
    ) -> Result<Self, AppError> {
        let store = LedgerStore::init(path, options).await?;
        Ok(Self::new(store, rates))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn base_currency(&self) -> &str {
        self.rates.base_currency()
    }

    /// Create an empty account and return its id.
    pub async fn open_account(&self) -> Result<AccountId, AppError> {
        let account = self.store.create_account().await?;
        tracing::info!(account_id = account.id, "account created");
        Ok(account.id)
    }

    // ========================
    // Mutations
    // ========================

    /// Credit an account from a bank card.
    pub async fn top_up(&self, account_id: AccountId, amount: Cents) -> Result<Cents, AppError> {
        self.mutator
            .mutate(Mutation::credit(account_id, amount, Channel::BankCard))
            .await
    }

    /// Debit an account for a purchase.
    pub async fn debit(&self, account_id: AccountId, amount: Cents) -> Result<Cents, AppError> {
        self.mutator
            .mutate(Mutation::debit(account_id, amount, Channel::Purchase))
            .await
    }

    /// Move money between accounts; returns the new balance of `to`.
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Cents,
    ) -> Result<Cents, AppError> {
        self.transfers.transfer(from, to, amount).await
    }

    // ========================
    // Queries
    // ========================

    /// Balance of an account, converted to `currency` when one is given.
    /// Without a currency (or with an empty one) the stored base balance is
    /// returned unchanged.
    pub async fn get_balance(
        &self,
        account_id: AccountId,
        currency: Option<&str>,
    ) -> Result<BalanceView, AppError> {
        let cents = self.queries.get_balance(account_id).await?;
        let base = cents_to_decimal(cents);

        let requested = currency.map(str::trim).filter(|c| !c.is_empty());
        let Some(requested) = requested else {
            return Ok(BalanceView {
                account_id,
                balance: base,
                currency: self.rates.base_currency().to_string(),
            });
        };

        let code = normalize_currency(requested)
            .map_err(|_| AppError::InvalidCurrency(requested.to_string()))?;
        let rate = self.rates.rate(&code).await?;
        Ok(BalanceView {
            account_id,
            balance: (base * rate).round_dp(2),
            currency: code,
        })
    }

    pub async fn get_transactions(
        &self,
        account_id: AccountId,
        page: PageRequest,
    ) -> Result<Vec<TransactionRecord>, AppError> {
        self.queries.get_transactions(account_id, page).await
    }

    pub async fn get_all_transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, AppError> {
        self.queries.get_all_transactions(account_id).await
    }
}
