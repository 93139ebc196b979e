use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Freeze requested while already frozen, or unfreeze while live.
    #[error("Invalid price state transition: {0}")]
    InvalidPriceState(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    MarketData(#[from] cartera_market_data::MarketDataError),

    #[error("Ledger error: {0}")]
    Ledger(String),
}
