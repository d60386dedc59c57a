//! Exchange rates used to display balances in other currencies.
//!
//! Balances are always stored in the base currency; a [`RateProvider`] only
//! supplies the multiplier from the base currency to a requested one.

mod fixed;
mod http;

pub use fixed::FixedRateProvider;
pub use http::{HttpRateProvider, RatesResponse};

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RateError {
    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),

    #[error("no rate available for {0}")]
    UnsupportedCurrency(String),

    #[error("rate service rejected the request")]
    Rejected,

    #[error("rate request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// ISO code of the currency balances are stored in.
    fn base_currency(&self) -> &str;

    /// How many units of `currency` one unit of the base currency buys.
    /// `currency` has already been normalized by [`normalize_currency`].
    async fn rate(&self, currency: &str) -> Result<Decimal, RateError>;
}

/// Validate and uppercase a three letter ISO 4217 code.
pub fn normalize_currency(code: &str) -> Result<String, RateError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RateError::InvalidCurrency(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_currency() {
        assert_eq!(normalize_currency("usd").unwrap(), "USD");
        assert_eq!(normalize_currency(" Uah ").unwrap(), "UAH");
        assert!(normalize_currency("US").is_err());
        assert!(normalize_currency("USDT").is_err());
        assert!(normalize_currency("U$D").is_err());
        assert!(normalize_currency("EUR&symbols=GBP").is_err());
    }
}
