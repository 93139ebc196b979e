use async_trait::async_trait;

use crate::assets::{Asset, AssetUpdate};
use crate::errors::Result;

/// Contract to the persistent asset ledger.
///
/// The ledger itself (creation, deletion, storage) lives outside this engine;
/// only reads and price-related updates pass through here.
#[async_trait]
pub trait AssetRepositoryTrait: Send + Sync {
    /// Tickers of every tracked holding, duplicates included.
    async fn list_tracked_tickers(&self) -> Result<Vec<String>>;

    async fn list_assets(&self) -> Result<Vec<Asset>>;

    async fn get_asset(&self, id: &str) -> Result<Asset>;

    /// Apply a partial, price-related update and return the stored record.
    async fn update_asset(&self, id: &str, update: AssetUpdate) -> Result<Asset>;
}
