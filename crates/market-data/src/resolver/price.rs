//! Price resolution with preferred/fallback vendors and a TTL cache.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::dispatcher::Dispatcher;
use crate::errors::{FallbackClass, MarketDataError};
use crate::models::{PriceQuote, QuoteSource};
use crate::provider::QuoteProvider;
use crate::resolver::cache::TtlCache;

/// How long a resolved price stays fresh unless the caller asks otherwise.
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(60);

/// Resolves current prices for tickers.
///
/// Tries the preferred vendor first, falls back to the alternate exactly
/// once, and caches whatever succeeds. A price counts as valid only when it
/// is strictly positive; the resolver never wraps zero in a success. When
/// both vendors fail the caller gets [`MarketDataError::NoPriceAvailable`]
/// and must keep its previously known value.
pub struct PriceResolver {
    providers: Vec<Arc<dyn QuoteProvider>>,
    dispatcher: Arc<Dispatcher>,
    cache: TtlCache<String, PriceQuote>,
    ttl: Duration,
}

impl PriceResolver {
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            providers,
            dispatcher,
            cache: TtlCache::new(),
            ttl: DEFAULT_PRICE_TTL,
        }
    }

    /// Override the default cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Normalize a user-supplied ticker for lookup.
    pub fn normalize_ticker(ticker: &str) -> String {
        ticker.trim().to_uppercase()
    }

    fn provider_for(&self, source: QuoteSource) -> Option<&Arc<dyn QuoteProvider>> {
        self.providers.iter().find(|p| p.source() == source)
    }

    /// Ask one specific vendor, bypassing the cache and without fallback.
    pub async fn resolve_from(
        &self,
        ticker: &str,
        source: QuoteSource,
    ) -> Result<Decimal, MarketDataError> {
        let ticker = Self::normalize_ticker(ticker);
        let provider = self
            .provider_for(source)
            .ok_or(MarketDataError::ConfigurationMissing("quote provider"))?;

        let _permit = self
            .dispatcher
            .admit(source.as_str(), provider.requests_per_minute())
            .await;
        let price = provider.fetch_price(&ticker).await?;

        if price <= Decimal::ZERO {
            return Err(MarketDataError::InvalidResponse {
                provider: source.as_str().to_string(),
                message: format!("non-positive price for {}: {}", ticker, price),
            });
        }

        Ok(price)
    }

    /// Resolve a ticker's current price with the default TTL.
    pub async fn resolve(
        &self,
        ticker: &str,
        preferred: QuoteSource,
    ) -> Result<PriceQuote, MarketDataError> {
        self.resolve_with_ttl(ticker, preferred, self.ttl).await
    }

    /// Resolve a ticker's current price.
    ///
    /// Order of attempts: live cache entry, preferred vendor, alternate
    /// vendor. Exactly one fallback attempt; no further cascading.
    pub async fn resolve_with_ttl(
        &self,
        ticker: &str,
        preferred: QuoteSource,
        ttl: Duration,
    ) -> Result<PriceQuote, MarketDataError> {
        let ticker = Self::normalize_ticker(ticker);

        if let Some(entry) = self.cache.get(&ticker) {
            debug!("price cache hit for {}", ticker);
            return Ok(entry.value.into_cached());
        }

        let mut last_error: Option<MarketDataError> = None;

        for source in [preferred, preferred.other()] {
            let Some(provider) = self.provider_for(source) else {
                continue;
            };

            let _permit = self
                .dispatcher
                .admit(source.as_str(), provider.requests_per_minute())
                .await;

            match provider.fetch_price(&ticker).await {
                Ok(price) if price > Decimal::ZERO => {
                    let quote = PriceQuote::new(ticker.clone(), price, source);
                    self.cache
                        .insert(ticker, quote.clone(), source.as_str(), ttl);
                    return Ok(quote);
                }
                Ok(price) => {
                    warn!("{} returned non-positive price {} for {}", source, price, ticker);
                    last_error = Some(MarketDataError::InvalidResponse {
                        provider: source.as_str().to_string(),
                        message: format!("non-positive price: {}", price),
                    });
                }
                Err(e) => match e.fallback_class() {
                    FallbackClass::AlternateProvider => {
                        debug!("{} failed for {}: {}, trying alternate", source, ticker, e);
                        last_error = Some(e);
                    }
                    FallbackClass::Terminal => return Err(e),
                },
            }
        }

        if let Some(e) = last_error {
            warn!("both vendors failed for {}: {}", ticker, e);
        }
        Err(MarketDataError::NoPriceAvailable { ticker })
    }
}
