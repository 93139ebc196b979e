//! Finnhub quote provider implementation.
//!
//! Fetches the current price from the /quote endpoint. Finnhub free tier is
//! limited to 60 API calls per minute.
//! API documentation: https://finnhub.io/docs/api

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::QuoteSource;
use crate::provider::{default_client, QuoteProvider};

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    // Note: d (change), dp (percent change), h, l, pc exist but not used
}

/// Finnhub quote provider.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_client(default_client(), api_key)
    }

    /// Create a provider sharing an existing HTTP client.
    pub fn with_client(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteResponse, MarketDataError> {
        let url = format!("{}/quote", BASE_URL);

        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(&[("symbol", symbol)])
            .send()
            .await
            .map_err(|e| MarketDataError::ProviderUnavailable {
                provider: PROVIDER_ID.to_string(),
                message: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {}", e)
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::ProviderUnavailable {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .json::<QuoteResponse>()
            .await
            .map_err(|e| MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("failed to parse quote response: {}", e),
            })
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn source(&self) -> QuoteSource {
        QuoteSource::Finnhub
    }

    fn requests_per_minute(&self) -> u32 {
        // Free tier limit
        60
    }

    async fn fetch_price(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        debug!("Fetching quote for {} from Finnhub", ticker);

        let quote = self.fetch_quote(ticker).await?;

        let close = quote.c.ok_or_else(|| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("no current price for symbol: {}", ticker),
        })?;

        // Finnhub returns 0 for unknown symbols instead of an error
        if !close.is_finite() || (close == 0.0 && quote.o.unwrap_or(0.0) == 0.0) {
            return Err(MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("symbol not found or no trading data: {}", ticker),
            });
        }

        Decimal::try_from(close).map_err(|_| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid price: {}", close),
        })
    }
}
