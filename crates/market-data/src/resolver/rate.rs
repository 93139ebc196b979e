//! USD/MXN exchange-rate resolution with a bounded backward day-walk.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{CurrencyPair, ExchangeRateRecord, RateSource};
use crate::provider::banxico::{DayObservation, RateSeries};
use crate::resolver::cache::TtlCache;

/// How long a resolved rate stays fresh.
pub const DEFAULT_RATE_TTL: Duration = Duration::from_secs(60 * 60);

/// Pesos per dollar used when the central bank cannot be consulted at all.
/// A deliberate, documented last resort; responses carry
/// [`RateSource::Fallback`] so callers can tell.
pub const FALLBACK_MXN_USD_RATE: u32 = 20;

/// Maximum observations consulted walking into the past, today included.
const MAX_DAY_WALK: u64 = 7;

/// Resolves the MXN/USD exchange rate.
///
/// The central-bank series only publishes on business days, so resolution
/// walks backward from today until it finds an observation, bounded to
/// [`MAX_DAY_WALK`] days. Genuine provider failures abort the walk
/// immediately. Without a configured credential, or when the walk comes up
/// empty, the resolver degrades to the fallback constant instead of failing
/// the request.
pub struct ExchangeRateResolver {
    /// `None` when no credential is configured.
    series: Option<Arc<dyn RateSeries>>,
    cache: TtlCache<CurrencyPair, ExchangeRateRecord>,
    ttl: Duration,
}

impl ExchangeRateResolver {
    pub fn new(series: Option<Arc<dyn RateSeries>>) -> Self {
        Self {
            series,
            cache: TtlCache::new(),
            ttl: DEFAULT_RATE_TTL,
        }
    }

    /// Override the default cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn fallback_record(today: NaiveDate) -> ExchangeRateRecord {
        ExchangeRateRecord {
            pair: CurrencyPair::MxnUsd,
            rate: Decimal::from(FALLBACK_MXN_USD_RATE),
            as_of_date: today,
            source: RateSource::Fallback,
        }
    }

    /// Resolve a from/to pair as supplied by a caller.
    ///
    /// Anything other than MXN into USD is [`MarketDataError::UnsupportedPair`].
    pub async fn resolve(&self, from: &str, to: &str) -> Result<ExchangeRateRecord, MarketDataError> {
        let pair = CurrencyPair::parse(from, to).ok_or_else(|| MarketDataError::UnsupportedPair {
            from: from.trim().to_uppercase(),
            to: to.trim().to_uppercase(),
        })?;
        Ok(self.resolve_pair(pair).await)
    }

    /// Resolve a supported pair. Always answers: the worst case is the
    /// fallback constant.
    pub async fn resolve_pair(&self, pair: CurrencyPair) -> ExchangeRateRecord {
        if let Some(entry) = self.cache.get(&pair) {
            debug!("rate cache hit for {}", pair);
            let mut record = entry.value;
            record.source = RateSource::Cache;
            return record;
        }

        let today = Utc::now().date_naive();

        let Some(series) = &self.series else {
            warn!("central-bank credential not configured, serving fallback rate");
            return Self::fallback_record(today);
        };

        match self.walk_series(series.as_ref(), today).await {
            Some(record) => {
                self.cache
                    .insert(pair, record.clone(), "central_bank", self.ttl);
                record
            }
            None => Self::fallback_record(today),
        }
    }

    /// Walk backward from `today`, consuming one observation per day.
    ///
    /// Not-published days are expected and keep the walk going; anything else
    /// ends it: a genuine provider failure, an implausible rate, or running
    /// out of days all yield `None` and the caller serves the fallback.
    async fn walk_series(
        &self,
        series: &dyn RateSeries,
        today: NaiveDate,
    ) -> Option<ExchangeRateRecord> {
        for offset in 0..MAX_DAY_WALK {
            let date = today.checked_sub_days(Days::new(offset))?;

            match series.observation(date).await {
                Ok(DayObservation::Found(rate)) => {
                    if rate <= Decimal::ONE {
                        // A fix at or below parity is corrupt data, not a rate.
                        warn!("central bank returned implausible rate {} for {}", rate, date);
                        return None;
                    }
                    debug!("resolved MXN/USD rate {} as of {}", rate, date);
                    return Some(ExchangeRateRecord {
                        pair: CurrencyPair::MxnUsd,
                        rate,
                        as_of_date: date,
                        source: RateSource::CentralBank,
                    });
                }
                Ok(DayObservation::NotPublished)
                | Err(MarketDataError::NotFoundForDate { .. }) => {
                    // Weekend or holiday; keep walking.
                    debug!("no observation for {}, walking back", date);
                }
                Err(e) => {
                    warn!("central bank lookup failed on {}: {}", date, e);
                    return None;
                }
            }
        }

        warn!(
            "no observation found in the last {} days, serving fallback rate",
            MAX_DAY_WALK
        );
        None
    }
}
