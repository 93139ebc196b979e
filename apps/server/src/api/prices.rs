use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartera_market_data::{MarketDataError, QuoteSource, DEFAULT_PRICE_TTL};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Deserialize)]
struct PriceQuery {
    ticker: String,
    source: Option<String>,
}

#[derive(Serialize)]
struct PriceResponse {
    price: Decimal,
}

/// Ask one specific vendor, no cache, no fallback.
async fn get_price(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PriceQuery>,
) -> ApiResult<Json<PriceResponse>> {
    let ticker = query.ticker.trim();
    if ticker.is_empty() {
        return Err(ApiError::bad_request("ticker is required"));
    }

    let source = query
        .source
        .as_deref()
        .and_then(QuoteSource::parse)
        .ok_or_else(|| ApiError::bad_request("source must be finnhub or polygon"))?;

    let price = state
        .price_resolver
        .resolve_from(ticker, source)
        .await
        .map_err(|e| match e {
            MarketDataError::InvalidResponse { .. } => {
                ApiError::not_found(format!("no price found for {}", ticker))
            }
            other => ApiError::internal(other.to_string()),
        })?;

    Ok(Json(PriceResponse { price }))
}

#[derive(Deserialize)]
struct UnifiedPriceQuery {
    ticker: String,
    preferred: Option<String>,
    /// Cache TTL in milliseconds
    ttl: Option<u64>,
}

#[derive(Serialize)]
struct UnifiedPriceResponse {
    price: Decimal,
    source: QuoteSource,
    cached: bool,
}

/// Preferred vendor with one fallback, served through the shared cache.
async fn get_unified_price(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UnifiedPriceQuery>,
) -> ApiResult<Json<UnifiedPriceResponse>> {
    let ticker = query.ticker.trim();
    if ticker.is_empty() {
        return Err(ApiError::bad_request("ticker is required"));
    }

    let preferred = match query.preferred.as_deref() {
        None => QuoteSource::Finnhub,
        Some(raw) => QuoteSource::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown source: {}", raw)))?,
    };

    let ttl = query
        .ttl
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_PRICE_TTL);

    let quote = state
        .price_resolver
        .resolve_with_ttl(ticker, preferred, ttl)
        .await?;

    Ok(Json(UnifiedPriceResponse {
        price: quote.price,
        source: quote.source,
        cached: quote.cached,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/price", get(get_price))
        .route("/api/price/unified", get(get_unified_price))
}
