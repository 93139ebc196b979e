//! Quote provider trait definition.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::QuoteSource;

/// Trait for quote vendors.
///
/// Implementations perform a single HTTP call and return the current price
/// for a ticker, or fail. All calls go through the dispatcher, which paces
/// requests per vendor; implementations must not sleep or retry themselves.
///
/// A returned price is always finite (the `Decimal` conversion rejects NaN
/// and infinities at the edge) but may still be non-positive for symbols the
/// vendor does not know; implementations reject those as
/// [`MarketDataError::InvalidResponse`].
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Which vendor this is. Used for provenance, pacing, and logging.
    fn source(&self) -> QuoteSource;

    /// The vendor's advertised request budget.
    fn requests_per_minute(&self) -> u32 {
        60
    }

    /// Fetch the current price for a ticker.
    ///
    /// The ticker is already normalized (trimmed, uppercased) by the
    /// resolver.
    async fn fetch_price(&self, ticker: &str) -> Result<Decimal, MarketDataError>;
}
