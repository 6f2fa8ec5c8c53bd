//! Set of keys currently being processed.
//!
//! `try_acquire` and `release` never block: a key is either claimed on the
//! spot or the caller is told it is taken.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::hash::Hash;

/// Concurrent claim/release key set
#[derive(Debug)]
pub struct InFlightSet<K: Eq + Hash> {
    keys: DashMap<K, ()>,
}

impl<K: Eq + Hash> Default for InFlightSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> InFlightSet<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: DashMap::new(),
        }
    }

    /// Claim `key`; returns false if it is already claimed
    pub fn try_acquire(&self, key: K) -> bool {
        match self.keys.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(());
                true
            }
        }
    }

    /// Release `key`; returns false if it was not claimed
    pub fn release(&self, key: &K) -> bool {
        self.keys.remove(key).is_some()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains_key(key)
    }

    /// Number of keys currently claimed
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
