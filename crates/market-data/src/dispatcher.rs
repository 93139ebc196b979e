//! Request pacing for upstream providers.
//!
//! Serializes outbound calls per provider to honor a fixed
//! requests-per-minute budget. Each provider gets its own lane with a single
//! in-flight slot; callers park on the lane in arrival order and are admitted
//! one at a time, spaced by the pacing interval. Lanes for different
//! providers drain independently.
//!
//! The queue is in-memory and best-effort: nothing survives a process
//! restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use tokio::sync::OwnedMutexGuard;

/// Pacing state for a single provider lane.
#[derive(Debug)]
struct Pacer {
    /// Issue time of the most recent request.
    last_request: Option<Instant>,
    /// Minimum spacing between consecutive requests.
    interval: Duration,
}

impl Pacer {
    fn new(requests_per_minute: u32) -> Self {
        Self {
            last_request: None,
            interval: Duration::from_millis(60_000 / u64::from(requests_per_minute.max(1))),
        }
    }
}

/// A held dispatch slot.
///
/// The provider's lane stays closed while the permit is alive, so the
/// underlying call never overlaps another call to the same provider. Drop
/// the permit once the call completes.
pub struct DispatchPermit {
    _slot: OwnedMutexGuard<Pacer>,
}

/// Per-provider request dispatcher.
///
/// Lanes are created on demand, keyed by provider id. The budget passed on
/// first admission fixes the lane's interval; later calls reuse it.
pub struct Dispatcher {
    lanes: Mutex<HashMap<String, Arc<tokio::sync::Mutex<Pacer>>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            lanes: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the lane map, recovering from poison if necessary.
    ///
    /// Worst case of recovering is a lane with slightly stale pacing state,
    /// which beats panicking.
    fn lock_lanes(&self) -> MutexGuard<'_, HashMap<String, Arc<tokio::sync::Mutex<Pacer>>>> {
        self.lanes.lock().unwrap_or_else(|poisoned| {
            warn!("Dispatcher lane map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn lane(&self, provider: &str, requests_per_minute: u32) -> Arc<tokio::sync::Mutex<Pacer>> {
        let mut lanes = self.lock_lanes();
        lanes
            .entry(provider.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Pacer::new(requests_per_minute))))
            .clone()
    }

    /// Acquire the provider's dispatch slot.
    ///
    /// Suspends the caller until (a) every earlier caller for the same
    /// provider has released its slot, in FIFO order, and (b) the pacing
    /// interval since the previous request has elapsed. The issue time is
    /// recorded when the permit is granted.
    pub async fn admit(&self, provider: &str, requests_per_minute: u32) -> DispatchPermit {
        let lane = self.lane(provider, requests_per_minute);
        let mut pacer = lane.lock_owned().await;

        if let Some(last) = pacer.last_request {
            let elapsed = last.elapsed();
            if elapsed < pacer.interval {
                let wait = pacer.interval - elapsed;
                debug!("Dispatcher: waiting {:?} for provider '{}'", wait, provider);
                tokio::time::sleep(wait).await;
            }
        }

        pacer.last_request = Some(Instant::now());
        debug!("Dispatcher: admitted request for '{}'", provider);

        DispatchPermit { _slot: pacer }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_admission_is_immediate() {
        let dispatcher = Dispatcher::new();

        let start = Instant::now();
        let permit = dispatcher.admit("FINNHUB", 60).await;
        drop(permit);

        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_consecutive_admissions_are_spaced() {
        let dispatcher = Dispatcher::new();

        // 6000 requests/minute = 10ms spacing, fast enough for a test
        drop(dispatcher.admit("FINNHUB", 6000).await);

        let start = Instant::now();
        drop(dispatcher.admit("FINNHUB", 6000).await);
        let elapsed = start.elapsed();

        assert!(elapsed.as_millis() >= 5, "second admission not paced: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_providers_pace_independently() {
        let dispatcher = Dispatcher::new();

        // 1 request/minute would block a same-lane follow-up for a minute
        drop(dispatcher.admit("FINNHUB", 1).await);

        let start = Instant::now();
        drop(dispatcher.admit("POLYGON", 1).await);

        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_slot_is_exclusive_per_provider() {
        let dispatcher = Arc::new(Dispatcher::new());

        let permit = dispatcher.admit("FINNHUB", 6000).await;

        // While the permit is held, a second caller must not get through.
        let contender = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.admit("FINNHUB", 6000).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!contender.is_finished());

        drop(permit);
        contender.await.unwrap();
    }
}
