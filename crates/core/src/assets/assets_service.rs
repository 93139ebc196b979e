use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use rust_decimal::Decimal;
use serde::Serialize;

use cartera_market_data::resolver::{ExchangeRateResolver, PriceResolver};
use cartera_market_data::{CurrencyPair, QuoteSource};

use crate::assets::{Asset, AssetRepositoryTrait, AssetUpdate, Currency};
use crate::errors::{CoreError, Result};
use crate::normalization::NormalizationEngine;

/// Outcome of one refresh cycle.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSummary {
    /// Assets whose `current_price_usd` was written
    pub updated: usize,
    /// Tickers that resolved to no price and kept their previous value
    pub failed: Vec<String>,
}

/// One asset with its normalized USD valuation.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetValuation {
    #[serde(flatten)]
    pub asset: Asset,
    /// Effective USD price after freeze precedence and normalization
    pub effective_price_usd: Decimal,
    pub cost_basis_usd: Decimal,
    pub market_value_usd: Decimal,
    pub pnl_usd: Decimal,
    pub pnl_percent: Decimal,
    /// Share of the portfolio's total market value, in percent
    pub portfolio_share: Decimal,
    /// A repair was indicated but the exchange rate was unusable
    pub flagged: bool,
}

pub struct AssetService {
    repository: Arc<dyn AssetRepositoryTrait>,
    prices: Arc<PriceResolver>,
    rates: Arc<ExchangeRateResolver>,
    normalization: NormalizationEngine,
}

impl AssetService {
    pub fn new(
        repository: Arc<dyn AssetRepositoryTrait>,
        prices: Arc<PriceResolver>,
        rates: Arc<ExchangeRateResolver>,
    ) -> Self {
        Self {
            repository,
            prices,
            rates,
            normalization: NormalizationEngine::new(),
        }
    }

    /// Refresh `current_price_usd` for every tracked ticker.
    ///
    /// Tickers are deduplicated before resolution so multiple lots of the
    /// same issue cost one upstream call. A ticker that resolves to no price
    /// keeps its previous stored value; zero is never written.
    pub async fn refresh_prices(&self, preferred: QuoteSource) -> Result<RefreshSummary> {
        let tickers = self.repository.list_tracked_tickers().await?;

        let mut seen = HashSet::new();
        let unique: Vec<String> = tickers
            .into_iter()
            .map(|t| PriceResolver::normalize_ticker(&t))
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();

        let mut resolved: HashMap<String, Decimal> = HashMap::new();
        let mut summary = RefreshSummary::default();

        for ticker in &unique {
            match self.prices.resolve(ticker, preferred).await {
                Ok(quote) => {
                    resolved.insert(quote.ticker.clone(), quote.price);
                }
                Err(e) => {
                    warn!("price refresh failed for {}: {}", ticker, e);
                    summary.failed.push(ticker.clone());
                }
            }
        }

        for asset in self.repository.list_assets().await? {
            let key = PriceResolver::normalize_ticker(&asset.ticker);
            if let Some(&price) = resolved.get(&key) {
                let update = AssetUpdate {
                    current_price_usd: Some(price),
                    last_updated: Some(Utc::now()),
                    ..Default::default()
                };
                self.repository.update_asset(&asset.id, update).await?;
                summary.updated += 1;
            }
        }

        info!(
            "price refresh: {} assets updated, {} tickers failed",
            summary.updated,
            summary.failed.len()
        );
        Ok(summary)
    }

    /// Pin an asset's valuation to a known price.
    pub async fn freeze_asset(&self, id: &str, price_usd: Decimal, source: &str) -> Result<Asset> {
        let mut asset = self.repository.get_asset(id).await?;
        asset.freeze(price_usd, source)?;
        let update = AssetUpdate {
            price_state: Some(asset.price_state.clone()),
            ..Default::default()
        };
        self.repository.update_asset(id, update).await
    }

    /// Release a pinned valuation.
    pub async fn unfreeze_asset(&self, id: &str) -> Result<Asset> {
        let mut asset = self.repository.get_asset(id).await?;
        asset.unfreeze()?;
        let update = AssetUpdate {
            price_state: Some(asset.price_state.clone()),
            ..Default::default()
        };
        self.repository.update_asset(id, update).await
    }

    /// Convert a user-entered purchase price to USD, once, at entry time.
    /// The ledger stores the original pair alongside the converted value.
    pub async fn convert_entry_price(&self, amount: Decimal, currency: Currency) -> Result<Decimal> {
        match currency {
            Currency::Usd => Ok(amount),
            Currency::Mxn => {
                let record = self.rates.resolve_pair(CurrencyPair::MxnUsd).await;
                if !record.is_usable() {
                    return Err(CoreError::InvalidInput(format!(
                        "exchange rate {} is unusable for conversion",
                        record.rate
                    )));
                }
                Ok(amount / record.rate)
            }
        }
    }

    /// Every asset with freeze precedence and normalization applied, plus the
    /// derived P&L figures the dashboard consumes.
    pub async fn portfolio_valuations(&self) -> Result<Vec<AssetValuation>> {
        let assets = self.repository.list_assets().await?;
        let rate = self.rates.resolve_pair(CurrencyPair::MxnUsd).await;

        let mut valuations: Vec<AssetValuation> = assets
            .into_iter()
            .map(|asset| {
                let normalized = self.normalization.normalize(&asset, rate.rate);
                let cost_basis = asset.quantity * normalized.purchase_price_usd;
                let market_value = asset.quantity * normalized.effective_price_usd;
                let pnl = market_value - cost_basis;
                let pnl_percent = if cost_basis > Decimal::ZERO {
                    pnl / cost_basis * Decimal::ONE_HUNDRED
                } else {
                    Decimal::ZERO
                };
                AssetValuation {
                    effective_price_usd: normalized.effective_price_usd,
                    cost_basis_usd: cost_basis,
                    market_value_usd: market_value,
                    pnl_usd: pnl,
                    pnl_percent,
                    portfolio_share: Decimal::ZERO,
                    flagged: normalized.flagged,
                    asset,
                }
            })
            .collect();

        let total: Decimal = valuations.iter().map(|v| v.market_value_usd).sum();
        if total > Decimal::ZERO {
            for valuation in &mut valuations {
                valuation.portfolio_share =
                    valuation.market_value_usd / total * Decimal::ONE_HUNDRED;
            }
        }

        Ok(valuations)
    }

    /// Persist normalization repairs for every stored asset. Idempotent.
    pub async fn repair_stored_prices(&self) -> Result<usize> {
        let rate = self.rates.resolve_pair(CurrencyPair::MxnUsd).await;
        if !rate.is_usable() {
            warn!("skipping stored-price repair, exchange rate is unusable");
            return Ok(0);
        }

        let mut repaired = 0;
        for asset in self.repository.list_assets().await? {
            if let Some(update) = self.normalization.repair_update(&asset, rate.rate) {
                self.repository.update_asset(&asset.id, update).await?;
                repaired += 1;
            }
        }
        if repaired > 0 {
            info!("re-derived USD values for {} assets", repaired);
        }
        Ok(repaired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PriceState;
    use async_trait::async_trait;
    use cartera_market_data::provider::banxico::{DayObservation, RateSeries};
    use cartera_market_data::provider::QuoteProvider;
    use cartera_market_data::{Dispatcher, MarketDataError};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::RwLock;

    struct FixedProvider {
        source: QuoteSource,
        prices: HashMap<String, Decimal>,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(source: QuoteSource, prices: &[(&str, Decimal)]) -> Arc<Self> {
            Arc::new(Self {
                source,
                prices: prices
                    .iter()
                    .map(|(t, p)| (t.to_string(), *p))
                    .collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl QuoteProvider for FixedProvider {
        fn source(&self) -> QuoteSource {
            self.source
        }

        fn requests_per_minute(&self) -> u32 {
            60_000
        }

        async fn fetch_price(&self, ticker: &str) -> std::result::Result<Decimal, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prices
                .get(ticker)
                .copied()
                .ok_or_else(|| MarketDataError::InvalidResponse {
                    provider: self.source.as_str().to_string(),
                    message: format!("unknown symbol {}", ticker),
                })
        }
    }

    struct FixedSeries {
        rate: Decimal,
    }

    #[async_trait]
    impl RateSeries for FixedSeries {
        async fn observation(
            &self,
            _date: NaiveDate,
        ) -> std::result::Result<DayObservation, MarketDataError> {
            Ok(DayObservation::Found(self.rate))
        }
    }

    struct InMemoryLedger {
        assets: RwLock<HashMap<String, Asset>>,
    }

    impl InMemoryLedger {
        fn new(assets: Vec<Asset>) -> Arc<Self> {
            Arc::new(Self {
                assets: RwLock::new(assets.into_iter().map(|a| (a.id.clone(), a)).collect()),
            })
        }

        fn get(&self, id: &str) -> Asset {
            self.assets.read().unwrap().get(id).unwrap().clone()
        }
    }

    #[async_trait]
    impl AssetRepositoryTrait for InMemoryLedger {
        async fn list_tracked_tickers(&self) -> Result<Vec<String>> {
            Ok(self
                .assets
                .read()
                .unwrap()
                .values()
                .map(|a| a.ticker.clone())
                .collect())
        }

        async fn list_assets(&self) -> Result<Vec<Asset>> {
            let mut assets: Vec<Asset> = self.assets.read().unwrap().values().cloned().collect();
            assets.sort_by(|a, b| a.ticker.cmp(&b.ticker));
            Ok(assets)
        }

        async fn get_asset(&self, id: &str) -> Result<Asset> {
            self.assets
                .read()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))
        }

        async fn update_asset(&self, id: &str, update: AssetUpdate) -> Result<Asset> {
            let mut assets = self.assets.write().unwrap();
            let asset = assets
                .get_mut(id)
                .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))?;
            update.apply(asset);
            Ok(asset.clone())
        }
    }

    fn asset(id: &str, ticker: &str, quantity: Decimal, purchase: Decimal, current: Decimal) -> Asset {
        Asset {
            id: id.to_string(),
            ticker: ticker.to_string(),
            quantity,
            purchase_price_usd: purchase,
            original_currency: Currency::Usd,
            original_purchase_price: purchase,
            current_price_usd: current,
            purchase_date: NaiveDate::from_ymd_opt(2024, 6, 17).unwrap(),
            price_state: PriceState::Live,
            last_updated: None,
        }
    }

    fn service_with(
        ledger: Arc<InMemoryLedger>,
        finnhub: Arc<FixedProvider>,
        polygon: Arc<FixedProvider>,
        rate: Decimal,
    ) -> AssetService {
        let prices = Arc::new(PriceResolver::new(
            vec![
                finnhub as Arc<dyn QuoteProvider>,
                polygon as Arc<dyn QuoteProvider>,
            ],
            Arc::new(Dispatcher::new()),
        ));
        let rates = Arc::new(ExchangeRateResolver::new(Some(
            Arc::new(FixedSeries { rate }) as Arc<dyn RateSeries>,
        )));
        AssetService::new(ledger, prices, rates)
    }

    #[tokio::test]
    async fn refresh_updates_prices_and_dedups_tickers() {
        let ledger = InMemoryLedger::new(vec![
            asset("a1", "TDOC", dec!(1), dec!(9.10), dec!(8.00)),
            asset("a2", "TDOC", dec!(10), dec!(5.11), dec!(8.00)),
            asset("a3", "AMD", dec!(7), dec!(158.92), dec!(150.00)),
        ]);
        let finnhub = FixedProvider::new(
            QuoteSource::Finnhub,
            &[("TDOC", dec!(10.50)), ("AMD", dec!(162.30))],
        );
        let polygon = FixedProvider::new(QuoteSource::Polygon, &[]);
        let service = service_with(ledger.clone(), finnhub.clone(), polygon, dec!(17.5));

        let summary = service.refresh_prices(QuoteSource::Finnhub).await.unwrap();

        assert_eq!(summary.updated, 3);
        assert!(summary.failed.is_empty());
        // Two lots of TDOC, one upstream call
        assert_eq!(finnhub.calls.load(Ordering::SeqCst), 2);
        assert_eq!(ledger.get("a1").current_price_usd, dec!(10.50));
        assert_eq!(ledger.get("a2").current_price_usd, dec!(10.50));
        assert_eq!(ledger.get("a3").current_price_usd, dec!(162.30));
    }

    #[tokio::test]
    async fn refresh_preserves_last_known_price_on_failure() {
        let ledger = InMemoryLedger::new(vec![asset("a1", "WBA", dec!(1), dec!(17.23), dec!(11.80))]);
        let finnhub = FixedProvider::new(QuoteSource::Finnhub, &[]);
        let polygon = FixedProvider::new(QuoteSource::Polygon, &[]);
        let service = service_with(ledger.clone(), finnhub, polygon, dec!(17.5));

        let summary = service.refresh_prices(QuoteSource::Finnhub).await.unwrap();

        assert_eq!(summary.updated, 0);
        assert_eq!(summary.failed, vec!["WBA".to_string()]);
        // Never overwritten with zero or null
        assert_eq!(ledger.get("a1").current_price_usd, dec!(11.80));
    }

    #[tokio::test]
    async fn freeze_takes_precedence_over_refresh() {
        let ledger = InMemoryLedger::new(vec![asset("a1", "NVDA", dec!(1), dec!(56.05), dec!(120.00))]);
        let finnhub = FixedProvider::new(QuoteSource::Finnhub, &[("NVDA", dec!(131.00))]);
        let polygon = FixedProvider::new(QuoteSource::Polygon, &[]);
        let service = service_with(ledger.clone(), finnhub, polygon, dec!(17.5));

        service.freeze_asset("a1", dec!(123.45), "polygon").await.unwrap();
        service.refresh_prices(QuoteSource::Finnhub).await.unwrap();

        let stored = ledger.get("a1");
        // The background refresh still landed on the live field
        assert_eq!(stored.current_price_usd, dec!(131.00));
        // Every consumer reads the pinned value
        assert_eq!(stored.effective_price_usd(), dec!(123.45));

        service.unfreeze_asset("a1").await.unwrap();
        assert_eq!(ledger.get("a1").effective_price_usd(), dec!(131.00));
    }

    #[tokio::test]
    async fn freeze_in_wrong_state_is_rejected() {
        let ledger = InMemoryLedger::new(vec![asset("a1", "PFE", dec!(2), dec!(73.34), dec!(28.00))]);
        let finnhub = FixedProvider::new(QuoteSource::Finnhub, &[]);
        let polygon = FixedProvider::new(QuoteSource::Polygon, &[]);
        let service = service_with(ledger, finnhub, polygon, dec!(17.5));

        service.freeze_asset("a1", dec!(30.00), "finnhub").await.unwrap();
        let error = service.freeze_asset("a1", dec!(31.00), "finnhub").await.unwrap_err();
        assert!(matches!(error, CoreError::InvalidPriceState(_)));

        service.unfreeze_asset("a1").await.unwrap();
        let error = service.unfreeze_asset("a1").await.unwrap_err();
        assert!(matches!(error, CoreError::InvalidPriceState(_)));
    }

    #[tokio::test]
    async fn entry_conversion_divides_mxn_by_rate() {
        let ledger = InMemoryLedger::new(vec![]);
        let finnhub = FixedProvider::new(QuoteSource::Finnhub, &[]);
        let polygon = FixedProvider::new(QuoteSource::Polygon, &[]);
        let service = service_with(ledger, finnhub, polygon, dec!(17.5));

        let usd = service
            .convert_entry_price(dec!(59.94), Currency::Mxn)
            .await
            .unwrap();
        assert_eq!(usd.round_dp(4), dec!(3.4251));

        let unchanged = service
            .convert_entry_price(dec!(20.34), Currency::Usd)
            .await
            .unwrap();
        assert_eq!(unchanged, dec!(20.34));
    }

    #[tokio::test]
    async fn valuations_apply_normalization_and_shares() {
        let ledger = InMemoryLedger::new(vec![
            // Mis-stored MXN purchase price, in-range current price
            asset("a1", "BIMBOA", dec!(5), dec!(599.40), dec!(4.00)),
            asset("a2", "HOOD", dec!(5), dec!(17.25), dec!(20.00)),
        ]);
        let finnhub = FixedProvider::new(QuoteSource::Finnhub, &[]);
        let polygon = FixedProvider::new(QuoteSource::Polygon, &[]);
        let service = service_with(ledger, finnhub, polygon, dec!(17.5));

        let valuations = service.portfolio_valuations().await.unwrap();
        assert_eq!(valuations.len(), 2);

        let bimboa = &valuations[0];
        assert_eq!(bimboa.asset.ticker, "BIMBOA");
        assert_eq!(bimboa.cost_basis_usd.round_dp(2), dec!(171.26));
        assert_eq!(bimboa.market_value_usd, dec!(20.00));

        let total: Decimal = valuations.iter().map(|v| v.portfolio_share).sum();
        assert_eq!(total.round_dp(6), dec!(100));
    }

    #[tokio::test]
    async fn stored_price_repair_is_idempotent() {
        let ledger = InMemoryLedger::new(vec![asset(
            "a1",
            "BIMBOA",
            dec!(5),
            dec!(599.40),
            dec!(980.00),
        )]);
        let finnhub = FixedProvider::new(QuoteSource::Finnhub, &[]);
        let polygon = FixedProvider::new(QuoteSource::Polygon, &[]);
        let service = service_with(ledger.clone(), finnhub, polygon, dec!(17.5));

        assert_eq!(service.repair_stored_prices().await.unwrap(), 1);
        let repaired = ledger.get("a1");
        assert_eq!(repaired.purchase_price_usd.round_dp(2), dec!(34.25));
        assert_eq!(repaired.current_price_usd, dec!(56.00));

        // Second pass finds nothing to do
        assert_eq!(service.repair_stored_prices().await.unwrap(), 0);
    }
}
