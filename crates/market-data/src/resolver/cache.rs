//! Process-wide TTL cache shared by all callers of a resolver.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::warn;

/// A cached value with its provenance and expiry.
#[derive(Clone, Debug)]
pub struct CachedEntry<T> {
    pub value: T,
    /// Who produced the value, for logging and provenance
    pub source: String,
    pub expires_at: Instant,
}

impl<T> CachedEntry<T> {
    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// In-memory cache with per-entry time-to-live.
///
/// A read past an entry's expiry is a miss and evicts the entry; it is never
/// returned. Writes are last-writer-wins: concurrent resolution of the same
/// key may race, and the freshest write stands.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, CachedEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the entry map, recovering from poison if necessary. Losing a
    /// cache generation is harmless; the next read re-resolves.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, CachedEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("TTL cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Fetch a live entry, or miss.
    pub fn get(&self, key: &K) -> Option<CachedEntry<V>> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live() => Some(CachedEntry {
                value: entry.value.clone(),
                source: entry.source.clone(),
                expires_at: entry.expires_at,
            }),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value that expires `ttl` from now.
    pub fn insert(&self, key: K, value: V, source: impl Into<String>, ttl: Duration) {
        let mut entries = self.lock();
        entries.insert(
            key,
            CachedEntry {
                value,
                source: source.into(),
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
