mod assets_model;
mod assets_service;
mod assets_traits;


pub use assets_model::{Asset, AssetUpdate, Currency, PriceState};
pub use assets_service::{AssetService, AssetValuation, RefreshSummary};
pub use assets_traits::AssetRepositoryTrait;
