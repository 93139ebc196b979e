//! In-memory stand-in for the external asset ledger.
//!
//! The real ledger (creation, deletion, durable storage) lives outside the
//! resolution engine; this implementation backs the HTTP app and its tests
//! through the same boundary trait.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use cartera_core::assets::{Asset, AssetRepositoryTrait, AssetUpdate, Currency, PriceState};
use cartera_core::{CoreError, Result};

pub struct InMemoryAssetRepository {
    assets: RwLock<HashMap<String, Asset>>,
}

impl InMemoryAssetRepository {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            assets: RwLock::new(assets.into_iter().map(|a| (a.id.clone(), a)).collect()),
        }
    }

    /// A demo portfolio to exercise the engine against.
    ///
    /// The MXN rows carry their raw peso purchase price in the USD field:
    /// legacy entries predating entry-time conversion, which the
    /// normalization engine re-derives on read.
    pub fn with_seed_portfolio() -> Self {
        let seed = vec![
            seeded("BOTZ", "USD", 5, "20.34"),
            seeded("HOOD", "USD", 5, "17.25"),
            seeded("PFE", "USD", 2, "73.34"),
            seeded("AMD", "USD", 7, "158.92"),
            seeded("QQQ", "USD", 1, "14.44"),
            seeded("SHOP", "USD", 10, "34.43"),
            seeded("NVDA", "USD", 1, "56.05"),
            seeded("HUM", "USD", 1, "96.00"),
            seeded("NKE", "USD", 1, "178.06"),
            seeded("CUERVO*", "MXN", 1, "16.84"),
            seeded("BIMBOA", "MXN", 5, "599.40"),
            seeded("LABB", "MXN", 10, "33.17"),
            seeded("SITES1A-1", "MXN", 2, "12.40"),
        ];
        Self::new(seed)
    }
}

fn seeded(ticker: &str, currency: &str, quantity: u32, purchase_price: &str) -> Asset {
    let price: Decimal = purchase_price.parse().expect("seed price literal");
    let currency = match currency {
        "MXN" => Currency::Mxn,
        _ => Currency::Usd,
    };
    Asset {
        id: Uuid::new_v4().to_string(),
        ticker: ticker.to_string(),
        quantity: Decimal::from(quantity),
        purchase_price_usd: price,
        original_currency: currency,
        original_purchase_price: price,
        current_price_usd: Decimal::ZERO,
        purchase_date: NaiveDate::from_ymd_opt(2024, 6, 17).expect("seed date literal"),
        price_state: PriceState::Live,
        last_updated: None,
    }
}

#[async_trait]
impl AssetRepositoryTrait for InMemoryAssetRepository {
    async fn list_tracked_tickers(&self) -> Result<Vec<String>> {
        let assets = self.read()?;
        Ok(assets.values().map(|a| a.ticker.clone()).collect())
    }

    async fn list_assets(&self) -> Result<Vec<Asset>> {
        let assets = self.read()?;
        let mut all: Vec<Asset> = assets.values().cloned().collect();
        all.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(all)
    }

    async fn get_asset(&self, id: &str) -> Result<Asset> {
        let assets = self.read()?;
        assets
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))
    }

    async fn update_asset(&self, id: &str, update: AssetUpdate) -> Result<Asset> {
        let mut assets = self
            .assets
            .write()
            .map_err(|e| CoreError::Ledger(e.to_string()))?;
        let asset = assets
            .get_mut(id)
            .ok_or_else(|| CoreError::AssetNotFound(id.to_string()))?;
        update.apply(asset);
        Ok(asset.clone())
    }
}

impl InMemoryAssetRepository {
    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<String, Asset>>> {
        self.assets
            .read()
            .map_err(|e| CoreError::Ledger(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_seed_portfolio_lists_all_tickers() {
        let repository = InMemoryAssetRepository::with_seed_portfolio();
        let tickers = repository.list_tracked_tickers().await.unwrap();
        assert_eq!(tickers.len(), 13);
        assert!(tickers.iter().any(|t| t == "BIMBOA"));
    }

    #[tokio::test]
    async fn test_update_unknown_asset_fails() {
        let repository = InMemoryAssetRepository::with_seed_portfolio();
        let error = repository
            .update_asset("missing", AssetUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(error, CoreError::AssetNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_persists_price_fields() {
        let repository = InMemoryAssetRepository::with_seed_portfolio();
        let assets = repository.list_assets().await.unwrap();
        let id = assets[0].id.clone();

        let update = AssetUpdate {
            current_price_usd: Some(dec!(162.30)),
            ..Default::default()
        };
        repository.update_asset(&id, update).await.unwrap();

        let stored = repository.get_asset(&id).await.unwrap();
        assert_eq!(stored.current_price_usd, dec!(162.30));
    }
}
