//! HTTP surface over [`BalanceService`].

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;

use crate::application::{AppError, BalanceService};

mod accounts;

pub use accounts::{AmountInput, BalanceResponse, TransactionView, TransferInput};

#[derive(Clone)]
pub struct ServerState {
    pub service: Arc<BalanceService>,
}

pub fn router(service: BalanceService) -> Router {
    let state = ServerState {
        service: Arc::new(service),
    };

    Router::new()
        .route("/balance/{account_id}", get(accounts::get_balance))
        .route("/transactions/{account_id}", get(accounts::get_transactions))
        .route("/top-up", post(accounts::top_up))
        .route("/debit", post(accounts::debit))
        .route("/transfer", post(accounts::transfer))
        .with_state(state)
}

pub async fn run_with_listener(
    service: BalanceService,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

pub enum ServerError {
    App(AppError),
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn status_for_app_error(err: &AppError) -> StatusCode {
    match err {
        AppError::AccountNotFound(_) => StatusCode::NOT_FOUND,
        AppError::InsufficientFunds { .. } | AppError::SelfTransfer(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AppError::InvalidAmount(_)
        | AppError::InvalidSort(_)
        | AppError::InvalidPage(_)
        | AppError::InvalidAccountId(_)
        | AppError::InvalidCurrency(_) => StatusCode::BAD_REQUEST,
        AppError::RateLookup(_) => StatusCode::BAD_GATEWAY,
        AppError::LedgerWriteFailed(_) | AppError::AtomicUnitFailed(_) | AppError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_app_error(err: AppError) -> String {
    match err {
        AppError::LedgerWriteFailed(_) | AppError::AtomicUnitFailed(_) | AppError::Database(_) => {
            tracing::error!("backend error: {err:#}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ServerError::App(err) => (status_for_app_error(&err), message_for_app_error(err)),
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<AppError> for ServerError {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

// Extractor rejections are reported with the same JSON body as every other
// client error.
impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}
