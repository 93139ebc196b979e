//! Error types and fallback classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`FallbackClass`]: Classification for determining fallback behavior

mod retry;

pub use retry::FallbackClass;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during price and exchange-rate resolution.
///
/// Each variant is classified via [`fallback_class`](Self::fallback_class),
/// which determines whether the price resolver should try the alternate
/// vendor before giving up.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The vendor could not be reached, timed out, or answered with a
    /// server-side or auth failure.
    #[error("Provider unavailable: {provider} - {message}")]
    ProviderUnavailable {
        /// The provider that was unavailable
        provider: String,
        /// What went wrong
        message: String,
    },

    /// The vendor answered, but the payload carried no usable price.
    /// Covers malformed bodies and non-positive or missing values.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The provider that returned the payload
        provider: String,
        /// Description of the problem
        message: String,
    },

    /// The central-bank series has no observation for the requested date.
    /// Expected on weekends and holidays; consumed inside the rate day-walk
    /// and never surfaced to callers.
    #[error("No observation published for {date}")]
    NotFoundForDate {
        /// The calendar date with no published observation
        date: NaiveDate,
    },

    /// Only the MXN/USD pair is supported.
    #[error("Unsupported currency pair: {from}/{to}")]
    UnsupportedPair {
        /// Requested source currency
        from: String,
        /// Requested target currency
        to: String,
    },

    /// Both vendors were tried and neither produced a usable price.
    /// Terminal; the caller must keep its previously known value.
    #[error("No price available for {ticker}")]
    NoPriceAvailable {
        /// The ticker that could not be priced
        ticker: String,
    },

    /// A required API credential is not configured.
    #[error("Missing configuration: {0}")]
    ConfigurationMissing(&'static str),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the fallback classification for this error.
    ///
    /// - [`FallbackClass::AlternateProvider`]: the failure is specific to one
    ///   vendor; the other vendor may still answer
    /// - [`FallbackClass::Terminal`]: switching vendors cannot help
    ///
    /// # Examples
    ///
    /// ```
    /// use cartera_market_data::errors::{FallbackClass, MarketDataError};
    ///
    /// let error = MarketDataError::InvalidResponse {
    ///     provider: "FINNHUB".to_string(),
    ///     message: "price was zero".to_string(),
    /// };
    /// assert_eq!(error.fallback_class(), FallbackClass::AlternateProvider);
    ///
    /// let error = MarketDataError::NoPriceAvailable { ticker: "AAPL".to_string() };
    /// assert_eq!(error.fallback_class(), FallbackClass::Terminal);
    /// ```
    pub fn fallback_class(&self) -> FallbackClass {
        match self {
            // Vendor-specific failures - the alternate vendor may still answer
            Self::ProviderUnavailable { .. }
            | Self::InvalidResponse { .. }
            | Self::ConfigurationMissing(_)
            | Self::Network(_) => FallbackClass::AlternateProvider,

            // Terminal - no vendor switch can change the outcome
            Self::NotFoundForDate { .. }
            | Self::UnsupportedPair { .. }
            | Self::NoPriceAvailable { .. } => FallbackClass::Terminal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_unavailable_tries_alternate() {
        let error = MarketDataError::ProviderUnavailable {
            provider: "FINNHUB".to_string(),
            message: "HTTP 500".to_string(),
        };
        assert_eq!(error.fallback_class(), FallbackClass::AlternateProvider);
    }

    #[test]
    fn test_invalid_response_tries_alternate() {
        let error = MarketDataError::InvalidResponse {
            provider: "POLYGON".to_string(),
            message: "no last trade in payload".to_string(),
        };
        assert_eq!(error.fallback_class(), FallbackClass::AlternateProvider);
    }

    #[test]
    fn test_missing_configuration_tries_alternate() {
        let error = MarketDataError::ConfigurationMissing("FINNHUB_API_KEY");
        assert_eq!(error.fallback_class(), FallbackClass::AlternateProvider);
    }

    #[test]
    fn test_unsupported_pair_is_terminal() {
        let error = MarketDataError::UnsupportedPair {
            from: "EUR".to_string(),
            to: "USD".to_string(),
        };
        assert_eq!(error.fallback_class(), FallbackClass::Terminal);
    }

    #[test]
    fn test_no_price_available_is_terminal() {
        let error = MarketDataError::NoPriceAvailable {
            ticker: "BIMBOA".to_string(),
        };
        assert_eq!(error.fallback_class(), FallbackClass::Terminal);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::NoPriceAvailable {
            ticker: "BIMBOA".to_string(),
        };
        assert_eq!(format!("{}", error), "No price available for BIMBOA");

        let error = MarketDataError::UnsupportedPair {
            from: "MXN".to_string(),
            to: "EUR".to_string(),
        };
        assert_eq!(format!("{}", error), "Unsupported currency pair: MXN/EUR");

        let error = MarketDataError::ProviderUnavailable {
            provider: "BANXICO".to_string(),
            message: "HTTP 401".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider unavailable: BANXICO - HTTP 401"
        );
    }
}
