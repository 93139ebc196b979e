use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{CurrencyPair, RateSource};

/// A resolved MXN-per-USD exchange rate observation.
///
/// `rate` is pesos per 1 US dollar: divide a MXN amount by `rate` to get USD,
/// multiply a USD amount by `rate` to get MXN. For this pair the rate sits
/// well above parity; a value at or below 1 is corrupt data and must never be
/// used for division.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeRateRecord {
    pub pair: CurrencyPair,

    /// MXN per 1 USD
    pub rate: Decimal,

    /// Calendar date of the observation the value belongs to. On non-business
    /// days this trails today by however far the day-walk had to go.
    pub as_of_date: NaiveDate,

    pub source: RateSource,
}

impl ExchangeRateRecord {
    /// Whether the rate can safely be used for unit conversion.
    pub fn is_usable(&self) -> bool {
        self.rate > Decimal::ONE
    }
}
