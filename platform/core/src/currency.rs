use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{DomainFault, PluginError};
use crate::types::Currency;

/// A single exchange-rate quote from a currency plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    pub base: Currency,
    pub target: Currency,
    pub value: f64,
    pub conversion_time: DateTime<Utc>,
}

/// Failures a currency plugin may declare as part of its contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CurrencyApiError {
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(Currency),

    #[error("rates unavailable: {0}")]
    RatesUnavailable(String),
}

impl DomainFault for CurrencyApiError {
    fn from_runtime(code: &str, message: &str) -> Self {
        match code {
            // The message carries the offending ISO code; anything
            // unparseable degrades to the catch-all.
            "unsupported_currency" => match message.parse::<Currency>() {
                Ok(currency) => CurrencyApiError::UnsupportedCurrency(currency),
                Err(_) => CurrencyApiError::RatesUnavailable(message.to_string()),
            },
            _ => CurrencyApiError::RatesUnavailable(message.to_string()),
        }
    }
}

/// The rate-lookup operations a plugin declaring
/// [`CapabilityKind::Currency`] must provide.
///
/// [`CapabilityKind::Currency`]: crate::types::CapabilityKind::Currency
#[async_trait]
pub trait CurrencyCapability: Send + Sync {
    /// Base currencies this plugin can quote from.
    async fn base_currencies(&self) -> Result<Vec<Currency>, PluginError<CurrencyApiError>>;

    /// Timestamp of the most recent rate set for `base`, if any exists.
    async fn latest_conversion_time(
        &self,
        base: Currency,
    ) -> Result<Option<DateTime<Utc>>, PluginError<CurrencyApiError>>;

    async fn current_rates(
        &self,
        base: Currency,
    ) -> Result<Vec<Rate>, PluginError<CurrencyApiError>>;

    /// Rates for `base` as of `at`; plugins return the closest set at or
    /// before that instant.
    async fn rates_at(
        &self,
        base: Currency,
        at: DateTime<Utc>,
    ) -> Result<Vec<Rate>, PluginError<CurrencyApiError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_currency_decodes_from_iso_code() {
        assert_eq!(
            CurrencyApiError::from_runtime("unsupported_currency", "JPY"),
            CurrencyApiError::UnsupportedCurrency(Currency::JPY)
        );
    }

    #[test]
    fn garbled_currency_degrades_to_rates_unavailable() {
        assert_eq!(
            CurrencyApiError::from_runtime("unsupported_currency", "doubloons"),
            CurrencyApiError::RatesUnavailable("doubloons".into())
        );
    }

    #[test]
    fn unknown_codes_fall_back_to_rates_unavailable() {
        assert_eq!(
            CurrencyApiError::from_runtime("upstream_timeout", "feed timed out"),
            CurrencyApiError::RatesUnavailable("feed timed out".into())
        );
    }
}
