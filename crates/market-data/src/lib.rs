//! Cartera Market Data Crate
//!
//! This crate resolves trustworthy current prices and the USD/MXN exchange
//! rate from unreliable, rate-limited upstream providers.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Two interchangeable quote vendors (Finnhub, Polygon) with identical
//!   contracts
//! - Per-provider request pacing honoring each vendor's per-minute budget
//! - Preferred/fallback price resolution with a TTL cache
//! - Central-bank exchange-rate resolution with a bounded backward day-walk
//!   and a documented fallback constant
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |     Caller       | --> |    Resolver      |  (cache, fallback, day-walk)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   Dispatcher     |  (per-provider FIFO pacing)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  (Finnhub, Polygon, Banxico)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PriceQuote`] - A resolved current price with provenance
//! - [`ExchangeRateRecord`] - A resolved MXN-per-USD observation
//! - [`QuoteSource`] / [`RateSource`] - Provenance tags
//! - [`MarketDataError`] - Failure taxonomy with fallback classification

pub mod dispatcher;
pub mod errors;
pub mod models;
pub mod provider;
pub mod resolver;

// Re-export all public types from models
pub use models::{CurrencyPair, ExchangeRateRecord, PriceQuote, QuoteSource, RateSource};

// Re-export provider types
pub use provider::banxico::{BanxicoClient, DayObservation, RateSeries};
pub use provider::{FinnhubProvider, PolygonProvider, QuoteProvider};

// Re-export dispatcher and resolver types
pub use dispatcher::{DispatchPermit, Dispatcher};
pub use errors::{FallbackClass, MarketDataError};
pub use resolver::{
    CachedEntry, ExchangeRateResolver, PriceResolver, TtlCache, DEFAULT_PRICE_TTL,
    DEFAULT_RATE_TTL, FALLBACK_MXN_USD_RATE,
};
