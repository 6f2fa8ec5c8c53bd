//! Matcher registry
//!
//! Matchers of one kind are kept sorted by ascending priority, ties in
//! insertion order. Dispatch reads a snapshot copy, so registration and
//! removal never race with a running evaluation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Matcher, MatcherHandle, MatcherId};
use crate::events::EventKind;

/// Process-wide matcher table
pub struct MatcherRegistry {
    matchers: RwLock<HashMap<EventKind, Vec<Arc<Matcher>>>>,
    next_id: AtomicU64,
}

impl MatcherRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            matchers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Store a matcher at its priority slot
    pub fn insert(self: &Arc<Self>, mut matcher: Matcher) -> MatcherHandle {
        matcher.id = MatcherId(self.next_id.fetch_add(1, Ordering::Relaxed));
        matcher.registry = Arc::downgrade(self);

        let handle = MatcherHandle {
            id: matcher.id,
            kind: matcher.kind,
            registry: Arc::downgrade(self),
        };

        let mut table = self.matchers.write();
        let list = table.entry(matcher.kind).or_default();
        let at = list.partition_point(|m| m.priority <= matcher.priority);
        tracing::debug!(
            kind = %matcher.kind,
            id = matcher.id.0,
            priority = matcher.priority,
            "Matcher registered"
        );
        list.insert(at, Arc::new(matcher));

        handle
    }

    /// Remove a matcher; false when it was not registered
    pub fn remove(&self, kind: EventKind, id: MatcherId) -> bool {
        let mut table = self.matchers.write();
        let Some(list) = table.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|m| m.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            table.remove(&kind);
        }
        removed
    }

    pub fn contains(&self, kind: EventKind, id: MatcherId) -> bool {
        self.matchers
            .read()
            .get(&kind)
            .is_some_and(|list| list.iter().any(|m| m.id == id))
    }

    /// Copy of the matchers of a kind, in evaluation order
    pub fn snapshot(&self, kind: EventKind) -> Vec<Arc<Matcher>> {
        self.matchers.read().get(&kind).cloned().unwrap_or_default()
    }

    /// Number of matchers registered for a kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.matchers.read().get(&kind).map_or(0, Vec::len)
    }

    /// Number of matchers over all kinds
    pub fn total(&self) -> usize {
        self.matchers.read().values().map(Vec::len).sum()
    }
}

impl Default for MatcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("matchers", &self.total())
            .finish()
    }
}
