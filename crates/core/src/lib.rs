//! Cartera domain layer.
//!
//! Owns the asset model and its price-freeze state machine, the ledger
//! boundary trait, the currency-normalization engine, and the refresh cycle
//! that keeps `current_price_usd` up to date through the market-data crate.

pub mod assets;
pub mod errors;
pub mod normalization;

pub use errors::{CoreError, Result};
