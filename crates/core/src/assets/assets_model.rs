use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

/// Currencies the ledger can record an entry in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Mxn,
}

/// Whether an asset's valuation follows the market or a user-pinned price.
///
/// The two states are symmetric: freezing pins a price, unfreezing returns to
/// the most recently resolved live price with no re-fetch. Provenance travels
/// with the pin so a frozen value is always attributable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PriceState {
    Live,
    #[serde(rename_all = "camelCase")]
    Frozen {
        price_usd: Decimal,
        /// Which vendor supplied the pinned value
        source: String,
        at: DateTime<Utc>,
    },
}

/// A tracked holding.
///
/// `purchase_price_usd` and `current_price_usd` are always USD-denominated in
/// storage; `original_currency` and `original_purchase_price` preserve the
/// user-entered, pre-conversion pair for audit and re-display.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub ticker: String,
    pub quantity: Decimal,
    pub purchase_price_usd: Decimal,
    pub original_currency: Currency,
    /// In `original_currency`
    pub original_purchase_price: Decimal,
    pub current_price_usd: Decimal,
    pub purchase_date: NaiveDate,
    pub price_state: PriceState,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Asset {
    /// The price every downstream calculation must use: the pinned value
    /// while frozen, the live value otherwise.
    pub fn effective_price_usd(&self) -> Decimal {
        match &self.price_state {
            PriceState::Live => self.current_price_usd,
            PriceState::Frozen { price_usd, .. } => *price_usd,
        }
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.price_state, PriceState::Frozen { .. })
    }

    /// Pin the valuation. Only valid while live.
    pub fn freeze(&mut self, price_usd: Decimal, source: impl Into<String>) -> Result<()> {
        if self.is_frozen() {
            return Err(CoreError::InvalidPriceState("asset is already frozen"));
        }
        if price_usd <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(format!(
                "frozen price must be positive, got {}",
                price_usd
            )));
        }
        self.price_state = PriceState::Frozen {
            price_usd,
            source: source.into(),
            at: Utc::now(),
        };
        Ok(())
    }

    /// Release the pin; the latest resolved live price takes effect at once.
    pub fn unfreeze(&mut self) -> Result<()> {
        match self.price_state {
            PriceState::Frozen { .. } => {
                self.price_state = PriceState::Live;
                Ok(())
            }
            PriceState::Live => Err(CoreError::InvalidPriceState("asset is not frozen")),
        }
    }
}

/// Partial update applied through the ledger boundary.
///
/// The resolution engine only ever touches price-related fields; everything
/// else on the asset belongs to the external ledger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub current_price_usd: Option<Decimal>,
    pub purchase_price_usd: Option<Decimal>,
    pub price_state: Option<PriceState>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl AssetUpdate {
    pub fn apply(self, asset: &mut Asset) {
        if let Some(price) = self.current_price_usd {
            asset.current_price_usd = price;
        }
        if let Some(price) = self.purchase_price_usd {
            asset.purchase_price_usd = price;
        }
        if let Some(state) = self.price_state {
            asset.price_state = state;
        }
        if let Some(at) = self.last_updated {
            asset.last_updated = Some(at);
        }
    }
}
