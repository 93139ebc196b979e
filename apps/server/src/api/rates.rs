use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartera_market_data::RateSource;

use crate::error::ApiResult;
use crate::main_lib::AppState;

#[derive(Deserialize)]
struct RateQuery {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Serialize)]
struct RateResponse {
    rate: Decimal,
    source: RateSource,
    date: NaiveDate,
}

/// Current MXN/USD exchange rate.
///
/// Always answers for the supported pair; when the central bank cannot be
/// consulted the response carries `source: "fallback"` so callers can tell a
/// degraded answer from a fresh one.
async fn get_exchange_rate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RateQuery>,
) -> ApiResult<Json<RateResponse>> {
    let from = query.from.as_deref().unwrap_or("MXN");
    let to = query.to.as_deref().unwrap_or("USD");

    let record = state.rate_resolver.resolve(from, to).await?;

    Ok(Json(RateResponse {
        rate: record.rate,
        source: record.source,
        date: record.as_of_date,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/exchange-rate", get(get_exchange_rate))
}
