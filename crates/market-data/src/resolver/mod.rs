//! Price and exchange-rate resolution.
//!
//! Resolvers own their caches and decide ordering, fallback, and the
//! exchange-rate day-walk. All upstream calls go through the dispatcher.

mod cache;
mod price;
mod rate;

pub use cache::{CachedEntry, TtlCache};
pub use price::{PriceResolver, DEFAULT_PRICE_TTL};
pub use rate::{ExchangeRateResolver, DEFAULT_RATE_TTL, FALLBACK_MXN_USD_RATE};
