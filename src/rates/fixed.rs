use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{RateError, RateProvider, normalize_currency};

/// Rates from an in-memory table. Useful offline and in tests.
#[derive(Debug, Clone)]
pub struct FixedRateProvider {
    base: String,
    rates: HashMap<String, Decimal>,
}

impl FixedRateProvider {
    pub fn new(base: &str) -> Self {
        let base = base.to_ascii_uppercase();
        let mut rates = HashMap::new();
        rates.insert(base.clone(), Decimal::ONE);
        Self { base, rates }
    }

    pub fn with_rate(mut self, currency: &str, rate: Decimal) -> Self {
        self.rates.insert(currency.to_ascii_uppercase(), rate);
        self
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    fn base_currency(&self) -> &str {
        &self.base
    }

    async fn rate(&self, currency: &str) -> Result<Decimal, RateError> {
        let currency = normalize_currency(currency)?;
        self.rates
            .get(&currency)
            .copied()
            .ok_or(RateError::UnsupportedCurrency(currency))
    }
}
