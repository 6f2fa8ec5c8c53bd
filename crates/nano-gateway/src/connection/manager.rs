//! Active session registry
//!
//! Sessions are discoverable here while they are connected. A session is
//! removed while it recovers from a dropped socket and added back once the
//! resume or re-identify succeeds.

use std::sync::Arc;

use dashmap::DashMap;

use super::Session;

/// Registry of connected sessions keyed by their READY session id
///
/// Uses `DashMap` for concurrent access from every shard's listen loop.
pub struct SessionManager {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a connected session, replacing any entry with the same id
    pub fn add(&self, session_id: impl Into<String>, session: Arc<Session>) {
        let session_id = session_id.into();
        tracing::debug!(session_id = %session_id, "Session registered");
        self.sessions.insert(session_id, session);
    }

    /// Remove a session; returns it when it was registered
    pub fn remove(&self, session_id: &str) -> Option<Arc<Session>> {
        let removed = self.sessions.remove(session_id).map(|(_, s)| s);
        if removed.is_some() {
            tracing::debug!(session_id = %session_id, "Session unregistered");
        }
        removed
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.get(session_id).map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    /// Ids of every registered session
    pub fn all_sessions(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }

    /// Every registered session
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions.iter().map(|r| Arc::clone(r.value())).collect()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
