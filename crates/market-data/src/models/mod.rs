//! Data models for price and exchange-rate resolution.

mod quote;
mod rate;
mod types;

pub use quote::PriceQuote;
pub use rate::ExchangeRateRecord;
pub use types::{CurrencyPair, QuoteSource, RateSource};
