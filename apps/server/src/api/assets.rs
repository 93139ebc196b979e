use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;

use cartera_core::assets::{Asset, AssetValuation, RefreshSummary};
use cartera_market_data::QuoteSource;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

/// Every tracked asset with freeze precedence and normalization applied.
async fn list_assets(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<AssetValuation>>> {
    let valuations = state.asset_service.portfolio_valuations().await?;
    Ok(Json(valuations))
}

#[derive(Deserialize)]
struct RefreshQuery {
    preferred: Option<String>,
}

/// Run one refresh cycle over all tracked tickers.
async fn refresh_prices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RefreshQuery>,
) -> ApiResult<Json<RefreshSummary>> {
    let preferred = match query.preferred.as_deref() {
        None => QuoteSource::Finnhub,
        Some(raw) => QuoteSource::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown source: {}", raw)))?,
    };

    let summary = state.asset_service.refresh_prices(preferred).await?;
    Ok(Json(summary))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FreezeRequest {
    price: Decimal,
    source: String,
}

/// Pin an asset's valuation to a known price.
async fn freeze_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<FreezeRequest>,
) -> ApiResult<Json<Asset>> {
    let asset = state
        .asset_service
        .freeze_asset(&id, body.price, &body.source)
        .await?;
    Ok(Json(asset))
}

/// Release a pinned valuation.
async fn unfreeze_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Asset>> {
    let asset = state.asset_service.unfreeze_asset(&id).await?;
    Ok(Json(asset))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/assets", get(list_assets))
        .route("/api/assets/refresh", post(refresh_prices))
        .route("/api/assets/{id}/freeze", post(freeze_asset))
        .route("/api/assets/{id}/unfreeze", post(unfreeze_asset))
}
