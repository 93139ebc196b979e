use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use cartera_core::assets::{AssetRepositoryTrait, AssetService};
use cartera_market_data::provider::banxico::RateSeries;
use cartera_market_data::{
    BanxicoClient, Dispatcher, ExchangeRateResolver, FinnhubProvider, PolygonProvider,
    PriceResolver, QuoteProvider,
};

use crate::config::Config;
use crate::store::InMemoryAssetRepository;

/// Process-wide singletons: every request shares the same resolvers, caches,
/// and dispatcher lanes.
pub struct AppState {
    pub price_resolver: Arc<PriceResolver>,
    pub rate_resolver: Arc<ExchangeRateResolver>,
    pub asset_service: Arc<AssetService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("CARTERA_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    let client = reqwest::Client::builder()
        .timeout(cartera_market_data::provider::REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    // A missing quote-vendor key is not fatal: the vendor answers with an
    // auth failure and the resolver falls over to the alternate.
    let finnhub = Arc::new(FinnhubProvider::with_client(
        client.clone(),
        config.finnhub_api_key.clone().unwrap_or_default(),
    ));
    let polygon = Arc::new(PolygonProvider::with_client(
        client.clone(),
        config.polygon_api_key.clone().unwrap_or_default(),
    ));

    let dispatcher = Arc::new(Dispatcher::new());
    let price_resolver = Arc::new(PriceResolver::new(
        vec![
            finnhub as Arc<dyn QuoteProvider>,
            polygon as Arc<dyn QuoteProvider>,
        ],
        dispatcher,
    ));

    let series = config
        .banxico_token
        .as_ref()
        .map(|token| Arc::new(BanxicoClient::with_client(client, token.clone())) as Arc<dyn RateSeries>);
    if series.is_none() {
        tracing::warn!("BANXICO_API_TOKEN not set; exchange rates will use the fallback constant");
    }
    let rate_resolver = Arc::new(ExchangeRateResolver::new(series));

    let repository: Arc<dyn AssetRepositoryTrait> =
        Arc::new(InMemoryAssetRepository::with_seed_portfolio());
    let asset_service = Arc::new(AssetService::new(
        repository,
        price_resolver.clone(),
        rate_resolver.clone(),
    ));

    Arc::new(AppState {
        price_resolver,
        rate_resolver,
        asset_service,
    })
}
