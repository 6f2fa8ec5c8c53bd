//! Generic TTL cache.
//!
//! Every write restarts the entry's lifetime; reads never extend it. Expired
//! entries are invisible to readers immediately and are swept out
//! opportunistically on writes.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Writes between opportunistic sweeps of expired entries
const SWEEP_EVERY: u64 = 64;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

struct Inner<K, V> {
    entries: HashMap<K, Entry<V>>,
    writes: u64,
}

/// Thread-safe map whose entries expire `ttl` after their last write
pub struct TtlCache<K, V> {
    ttl: Duration,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache with the given entry lifetime
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                writes: 0,
            }),
        }
    }

    /// Entry lifetime
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live value
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone())
    }

    /// Insert or replace a value, restarting its lifetime
    pub fn set(&self, key: K, value: V) {
        self.update(key, |_| value);
    }

    /// Replace the value for `key` with `f(current)` under one lock
    ///
    /// `current` is `None` when the key is absent or expired. The new value
    /// gets a fresh lifetime. Returns a clone of what was stored.
    pub fn update<F>(&self, key: K, f: F) -> V
    where
        F: FnOnce(Option<V>) -> V,
    {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        inner.writes = inner.writes.wrapping_add(1);
        if inner.writes % SWEEP_EVERY == 0 {
            inner.entries.retain(|_, e| e.expires_at > now);
        }

        let current = inner
            .entries
            .remove(&key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value);
        let value = f(current);
        inner.entries.insert(
            key,
            Entry {
                value: value.clone(),
                expires_at: now + self.ttl,
            },
        );
        value
    }

    /// Remove a value, returning it if it was still live
    pub fn remove(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.inner
            .lock()
            .entries
            .remove(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .lock()
            .entries
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry now, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.expires_at > now);
        before - inner.entries.len()
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.inner.lock().entries.len())
            .finish()
    }
}
