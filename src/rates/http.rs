use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{RateError, RateProvider, normalize_currency};

/// Body returned by exchangeratesapi.io style `latest` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub rates: HashMap<String, Decimal>,
}

impl RatesResponse {
    fn into_rate(mut self, currency: String) -> Result<Decimal, RateError> {
        if !self.success {
            return Err(RateError::Rejected);
        }
        self.rates
            .remove(&currency)
            .ok_or(RateError::UnsupportedCurrency(currency))
    }
}

/// Looks up rates over HTTP, one request per conversion.
#[derive(Debug, Clone)]
pub struct HttpRateProvider {
    client: reqwest::Client,
    base_url: String,
    access_key: String,
    base: String,
}

impl HttpRateProvider {
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        base: &str,
        timeout: Duration,
    ) -> Result<Self, RateError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            access_key: access_key.into(),
            base: normalize_currency(base)?,
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn base_currency(&self) -> &str {
        &self.base
    }

    async fn rate(&self, currency: &str) -> Result<Decimal, RateError> {
        let currency = normalize_currency(currency)?;
        if currency == self.base {
            return Ok(Decimal::ONE);
        }

        tracing::debug!(currency = %currency, "requesting exchange rate");
        let response: RatesResponse = self
            .client
            .get(&self.base_url)
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("base", self.base.as_str()),
                ("symbols", currency.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_rate(currency)
    }
}
