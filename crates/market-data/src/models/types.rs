use std::fmt;

use serde::{Deserialize, Serialize};

/// Quote vendor identifier.
///
/// The two vendors are interchangeable behind the same contract; the resolver
/// only cares about which one answered, for provenance and pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    Finnhub,
    Polygon,
}

impl QuoteSource {
    /// The alternate vendor, used for the single fallback attempt.
    pub fn other(self) -> Self {
        match self {
            Self::Finnhub => Self::Polygon,
            Self::Polygon => Self::Finnhub,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Finnhub => "finnhub",
            Self::Polygon => "polygon",
        }
    }

    /// Parse a query-string value. Case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "finnhub" => Some(Self::Finnhub),
            "polygon" => Some(Self::Polygon),
            _ => None,
        }
    }
}

impl fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a resolved exchange rate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Fresh observation from the central-bank series.
    CentralBank,
    /// Served from the resolver cache.
    Cache,
    /// The documented last-resort constant.
    Fallback,
}

/// Supported currency pairs. Only MXN/USD today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyPair {
    MxnUsd,
}

impl CurrencyPair {
    /// Parse a from/to currency pair. Case-insensitive; returns `None` for
    /// anything other than MXN into USD.
    pub fn parse(from: &str, to: &str) -> Option<Self> {
        if from.trim().eq_ignore_ascii_case("MXN") && to.trim().eq_ignore_ascii_case("USD") {
            Some(Self::MxnUsd)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MxnUsd => "MXN_USD",
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
