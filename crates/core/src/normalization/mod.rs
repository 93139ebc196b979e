//! Currency normalization for stored monetary values.
//!
//! Guarantees that every monetary figure consumed downstream is USD,
//! self-healing values that were stored as raw MXN amounts. The heuristic is
//! best-effort policy, not a type system; it stays isolated behind
//! [`NormalizationEngine`] so an explicit tagged money value could replace it
//! without touching callers.

mod engine;
mod threshold;

pub use engine::{NormalizationEngine, NormalizedPrices};
pub use threshold::SuspiciousThresholdTable;
