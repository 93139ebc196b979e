//! Polygon.io quote provider implementation.
//!
//! Fetches the most recent trade from the /v2/last/trade endpoint.
//! API documentation: https://polygon.io/docs/stocks

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::QuoteSource;
use crate::provider::{default_client, QuoteProvider};

const BASE_URL: &str = "https://api.polygon.io";
const PROVIDER_ID: &str = "POLYGON";

/// Response from /v2/last/trade endpoint
#[derive(Debug, Deserialize)]
struct LastTradeResponse {
    results: Option<LastTrade>,
}

#[derive(Debug, Deserialize)]
struct LastTrade {
    /// Last trade price
    p: f64,
}

/// Polygon.io quote provider.
pub struct PolygonProvider {
    client: Client,
    api_key: String,
}

impl PolygonProvider {
    /// Create a new Polygon provider with the given API key.
    pub fn new(api_key: String) -> Self {
        Self::with_client(default_client(), api_key)
    }

    /// Create a provider sharing an existing HTTP client.
    pub fn with_client(client: Client, api_key: String) -> Self {
        Self { client, api_key }
    }
}

/// BMV tickers carry suffix characters the vendor does not recognize
/// ("CUERVO*", "SITES1A-1"); only the leading alphanumeric run is sent.
fn clean_ticker(ticker: &str) -> &str {
    let end = ticker
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(ticker.len());
    &ticker[..end]
}

#[async_trait]
impl QuoteProvider for PolygonProvider {
    fn source(&self) -> QuoteSource {
        QuoteSource::Polygon
    }

    fn requests_per_minute(&self) -> u32 {
        // Free tier allows 5 calls per minute
        5
    }

    async fn fetch_price(&self, ticker: &str) -> Result<Decimal, MarketDataError> {
        let symbol = clean_ticker(ticker);
        let url = format!("{}/v2/last/trade/{}", BASE_URL, symbol);

        debug!("Fetching last trade for {} from Polygon", symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("apiKey", &self.api_key)])
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

        // Polygon answers 404 for tickers it does not know
        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("no trade data for symbol: {}", symbol),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderUnavailable {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let payload: LastTradeResponse =
            response
                .json()
                .await
                .map_err(|e| MarketDataError::InvalidResponse {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("failed to parse last trade response: {}", e),
                })?;

        let trade = payload
            .results
            .ok_or_else(|| MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("no trade data for symbol: {}", symbol),
            })?;

        if !trade.p.is_finite() || trade.p <= 0.0 {
            return Err(MarketDataError::InvalidResponse {
                provider: PROVIDER_ID.to_string(),
                message: format!("invalid price: {}", trade.p),
            });
        }

        Decimal::try_from(trade.p).map_err(|_| MarketDataError::InvalidResponse {
            provider: PROVIDER_ID.to_string(),
            message: format!("invalid price: {}", trade.p),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_source() {
        let provider = PolygonProvider::new("test_key".to_string());
        assert_eq!(provider.source(), QuoteSource::Polygon);
    }

    #[test]
    fn test_clean_ticker_plain() {
        assert_eq!(clean_ticker("AAPL"), "AAPL");
        assert_eq!(clean_ticker("BIMBOA"), "BIMBOA");
    }

    #[test]
    fn test_clean_ticker_bmv_suffixes() {
        assert_eq!(clean_ticker("CUERVO*"), "CUERVO");
        assert_eq!(clean_ticker("SITES1A-1"), "SITES1A");
    }

    #[test]
    fn test_clean_ticker_empty() {
        assert_eq!(clean_ticker(""), "");
        assert_eq!(clean_ticker("*"), "");
    }

    #[test]
    fn test_last_trade_response_parsing() {
        let json = r#"{
            "request_id": "f05562305bd26ced64b98ed68b3c5d96",
            "status": "OK",
            "results": {
                "T": "AAPL",
                "p": 150.25,
                "s": 100,
                "t": 1617901342969796400
            }
        }"#;

        let response: LastTradeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.unwrap().p, 150.25);
    }

    #[test]
    fn test_last_trade_response_missing_results() {
        let json = r#"{"status": "NOT_FOUND"}"#;

        let response: LastTradeResponse = serde_json::from_str(json).unwrap();
        assert!(response.results.is_none());
    }
}
