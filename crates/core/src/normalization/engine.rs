//! The normalization engine itself.

use log::warn;
use rust_decimal::Decimal;

use crate::assets::{Asset, AssetUpdate};

use super::threshold::SuspiciousThresholdTable;

/// Effective USD values for one asset after normalization.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedPrices {
    pub purchase_price_usd: Decimal,
    /// Frozen price while pinned, live price otherwise, either way corrected.
    pub effective_price_usd: Decimal,
    /// True when at least one stored value was re-derived from the rate.
    pub repaired: bool,
    /// True when a repair was indicated but the rate was unusable; the
    /// uncorrected values are propagated and the asset needs attention.
    pub flagged: bool,
}

/// Re-derives USD values that were stored as raw MXN amounts.
///
/// A stored value above its ticker's plausibility ceiling is presumed
/// mis-denominated and divided by the current MXN-per-USD rate. The repair is
/// idempotent: a corrected value falls back under the ceiling, so re-running
/// it cannot double-convert. Division by a rate at or below parity is
/// refused, since that would inflate rather than correct.
#[derive(Clone, Debug, Default)]
pub struct NormalizationEngine {
    table: SuspiciousThresholdTable,
}

impl NormalizationEngine {
    pub fn new() -> Self {
        Self {
            table: SuspiciousThresholdTable::new(),
        }
    }

    pub fn with_table(table: SuspiciousThresholdTable) -> Self {
        Self { table }
    }

    fn correct(
        &self,
        ticker: &str,
        value: Decimal,
        ceiling: Decimal,
        rate: Decimal,
        flagged: &mut bool,
    ) -> (Decimal, bool) {
        if value <= ceiling {
            return (value, false);
        }
        if rate <= Decimal::ONE {
            warn!(
                "{}: stored value {} exceeds ceiling {} but rate {} is unusable, leaving as-is",
                ticker, value, ceiling, rate
            );
            *flagged = true;
            return (value, false);
        }
        (value / rate, true)
    }

    /// Produce the effective USD values for an asset.
    pub fn normalize(&self, asset: &Asset, rate: Decimal) -> NormalizedPrices {
        let ceiling = self.table.lookup(&asset.ticker);
        let mut flagged = false;

        let (purchase, purchase_repaired) = self.correct(
            &asset.ticker,
            asset.purchase_price_usd,
            ceiling,
            rate,
            &mut flagged,
        );
        let (effective, effective_repaired) = self.correct(
            &asset.ticker,
            asset.effective_price_usd(),
            ceiling,
            rate,
            &mut flagged,
        );

        NormalizedPrices {
            purchase_price_usd: purchase,
            effective_price_usd: effective,
            repaired: purchase_repaired || effective_repaired,
            flagged,
        }
    }

    /// Build the ledger update that persists a repair, if one is needed.
    ///
    /// Only the stored `purchase_price_usd` and `current_price_usd` fields
    /// are corrected; a frozen pin is user-supplied and stays untouched in
    /// storage (reads through [`normalize`](Self::normalize) still correct
    /// it). Returns `None` when the stored values are already in range, which
    /// is what makes re-running the repair a no-op.
    pub fn repair_update(&self, asset: &Asset, rate: Decimal) -> Option<AssetUpdate> {
        let ceiling = self.table.lookup(&asset.ticker);
        let mut flagged = false;

        let (purchase, purchase_repaired) = self.correct(
            &asset.ticker,
            asset.purchase_price_usd,
            ceiling,
            rate,
            &mut flagged,
        );
        let (current, current_repaired) = self.correct(
            &asset.ticker,
            asset.current_price_usd,
            ceiling,
            rate,
            &mut flagged,
        );

        if !purchase_repaired && !current_repaired {
            return None;
        }

        Some(AssetUpdate {
            purchase_price_usd: purchase_repaired.then_some(purchase),
            current_price_usd: current_repaired.then_some(current),
            ..Default::default()
        })
    }
}
