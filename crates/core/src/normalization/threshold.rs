//! Plausibility ceilings for stored USD prices.
//!
//! A stored price above its ticker's ceiling is presumed to be a
//! mis-denominated MXN amount. Per-ticker entries always win over the
//! defaults; the entries carry the known high-priced issues so the defaults
//! only apply to the long tail. The table is tunable policy, consulted and
//! never mutated.

use std::collections::HashMap;

use lazy_static::lazy_static;
use rust_decimal::Decimal;

/// Ceiling for a ticker with no entry and no recognized foreign suffix.
const GLOBAL_DEFAULT: i64 = 200;

/// Ceiling for issues carrying a recognized non-US venue suffix, where
/// USD-equivalent prices run higher than the typical domestic issue.
const FOREIGN_SUFFIX_DEFAULT: i64 = 1_000;

/// Venue suffixes recognized as non-US listings.
const FOREIGN_SUFFIXES: &[&str] = &[".MX", ".AS", ".SW", ".PA", ".L", ".MI", ".MC", ".F"];

lazy_static! {
    /// Issues whose legitimate USD price sits above the global default.
    /// Without an entry these would be "repaired" into nonsense.
    static ref TICKER_CEILINGS: HashMap<&'static str, Decimal> = {
        let mut m = HashMap::new();
        m.insert("BRK.A", Decimal::from(700_000));
        m.insert("NVR", Decimal::from(10_000));
        m.insert("BKNG", Decimal::from(5_000));
        m.insert("AZO", Decimal::from(4_000));
        m.insert("ASML", Decimal::from(1_200));
        m.insert("NVDA", Decimal::from(1_500));
        m.insert("REGN", Decimal::from(1_500));
        m.insert("NFLX", Decimal::from(900));
        m.insert("INTU", Decimal::from(800));
        m.insert("COST", Decimal::from(1_200));
        m.insert("LLY", Decimal::from(1_000));
        m.insert("UNH", Decimal::from(700));
        m.insert("GS", Decimal::from(600));
        m.insert("META", Decimal::from(700));
        m.insert("ISRG", Decimal::from(600));
        m.insert("VRTX", Decimal::from(600));
        m.insert("ADBE", Decimal::from(700));
        m.insert("HD", Decimal::from(450));
        m.insert("MSFT", Decimal::from(550));
        m.insert("SPY", Decimal::from(650));
        m.insert("QQQ", Decimal::from(600));
        m.insert("IVV", Decimal::from(650));
        m.insert("VOO", Decimal::from(600));
        m
    };
}

/// Static mapping from ticker to maximum plausible USD price.
#[derive(Clone, Debug)]
pub struct SuspiciousThresholdTable {
    foreign_suffix_default: Decimal,
    global_default: Decimal,
}

impl SuspiciousThresholdTable {
    pub fn new() -> Self {
        Self {
            foreign_suffix_default: Decimal::from(FOREIGN_SUFFIX_DEFAULT),
            global_default: Decimal::from(GLOBAL_DEFAULT),
        }
    }

    /// The ceiling for one ticker.
    pub fn lookup(&self, ticker: &str) -> Decimal {
        let ticker = ticker.trim().to_uppercase();
        if let Some(ceiling) = TICKER_CEILINGS.get(ticker.as_str()) {
            return *ceiling;
        }
        if has_foreign_suffix(&ticker) {
            self.foreign_suffix_default
        } else {
            self.global_default
        }
    }
}

impl Default for SuspiciousThresholdTable {
    fn default() -> Self {
        Self::new()
    }
}

fn has_foreign_suffix(ticker: &str) -> bool {
    FOREIGN_SUFFIXES.iter().any(|suffix| ticker.ends_with(suffix))
}
