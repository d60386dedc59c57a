//! Balance and transaction endpoints.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{
    AccountId, Cents, DEFAULT_LIMIT, DEFAULT_PAGE, PageRequest, Sort, TransactionRecord,
    cents_to_decimal, decimal_to_cents, is_valid_account_id,
};

use super::{ServerError, ServerState};

#[derive(Debug, Clone, Deserialize)]
pub struct AmountInput {
    pub account_id: AccountId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferInput {
    pub account_id: AccountId,
    pub to_id: AccountId,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account_id: AccountId,
    pub balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: i64,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub operation: String,
    pub date: DateTime<Utc>,
}

impl From<TransactionRecord> for TransactionView {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            account_id: record.account_id,
            amount: cents_to_decimal(record.amount),
            operation: record.operation,
            date: record.date,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
}

impl TransactionsQuery {
    fn into_page(self) -> Result<PageRequest, ServerError> {
        let sort = match self.sort.as_deref() {
            Some(sort) if !sort.trim().is_empty() => sort
                .parse::<Sort>()
                .map_err(|err| ServerError::App(err.into()))?,
            _ => Sort::default(),
        };
        Ok(PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(DEFAULT_LIMIT),
            sort,
        ))
    }
}

fn require_account_id(id: AccountId, field: &str) -> Result<AccountId, ServerError> {
    if is_valid_account_id(id) {
        Ok(id)
    } else {
        Err(ServerError::BadRequest(format!("incorrect {field}")))
    }
}

fn amount_in_cents(amount: Decimal) -> Result<Cents, ServerError> {
    decimal_to_cents(amount).map_err(|err| ServerError::BadRequest(err.to_string()))
}

pub async fn get_balance(
    State(state): State<ServerState>,
    account_id: Result<Path<AccountId>, PathRejection>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let Path(account_id) = account_id?;
    let Query(query) = query?;
    let account_id = require_account_id(account_id, "account id")?;
    let view = state
        .service
        .get_balance(account_id, query.currency.as_deref())
        .await?;

    Ok(Json(BalanceResponse {
        account_id: view.account_id,
        balance: view.balance,
        currency: Some(view.currency),
    }))
}

pub async fn get_transactions(
    State(state): State<ServerState>,
    account_id: Result<Path<AccountId>, PathRejection>,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let Path(account_id) = account_id?;
    let Query(query) = query?;
    let account_id = require_account_id(account_id, "account id")?;
    let page = query.into_page()?;
    let records = state.service.get_transactions(account_id, page).await?;

    Ok(Json(records.into_iter().map(TransactionView::from).collect()))
}

pub async fn top_up(
    State(state): State<ServerState>,
    input: Result<Json<AmountInput>, JsonRejection>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let Json(input) = input?;
    let account_id = require_account_id(input.account_id, "account id")?;
    let amount = amount_in_cents(input.amount)?;
    let balance = state.service.top_up(account_id, amount).await?;

    Ok(Json(BalanceResponse {
        account_id,
        balance: cents_to_decimal(balance),
        currency: None,
    }))
}

pub async fn debit(
    State(state): State<ServerState>,
    input: Result<Json<AmountInput>, JsonRejection>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let Json(input) = input?;
    let account_id = require_account_id(input.account_id, "account id")?;
    let amount = amount_in_cents(input.amount)?;
    let balance = state.service.debit(account_id, amount).await?;

    Ok(Json(BalanceResponse {
        account_id,
        balance: cents_to_decimal(balance),
        currency: None,
    }))
}

pub async fn transfer(
    State(state): State<ServerState>,
    input: Result<Json<TransferInput>, JsonRejection>,
) -> Result<Json<BalanceResponse>, ServerError> {
    let Json(input) = input?;
    let from = require_account_id(input.account_id, "account id")?;
    let to = require_account_id(input.to_id, "to id")?;
    let amount = amount_in_cents(input.amount)?;
    let balance = state.service.transfer(from, to, amount).await?;

    Ok(Json(BalanceResponse {
        account_id: to,
        balance: cents_to_decimal(balance),
        currency: None,
    }))
}
