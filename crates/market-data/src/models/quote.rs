use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::QuoteSource;

/// A resolved current price for a single ticker.
///
/// Ephemeral: produced by the price resolver, consumed immediately or held in
/// its cache; never persisted beyond the cache TTL.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Normalized ticker the price belongs to
    pub ticker: String,

    /// Current price. Strictly positive; a zero or negative value is never
    /// wrapped in a quote.
    pub price: Decimal,

    /// Vendor that supplied the value
    pub source: QuoteSource,

    /// When the value was resolved
    pub resolved_at: DateTime<Utc>,

    /// True when the value was served from the resolver cache
    pub cached: bool,
}

impl PriceQuote {
    /// Create a freshly resolved (non-cached) quote.
    pub fn new(ticker: impl Into<String>, price: Decimal, source: QuoteSource) -> Self {
        Self {
            ticker: ticker.into(),
            price,
            source,
            resolved_at: Utc::now(),
            cached: false,
        }
    }

    /// Tag the quote as a cache hit.
    pub fn into_cached(mut self) -> Self {
        self.cached = true;
        self
    }
}
