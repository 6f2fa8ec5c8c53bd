//! Single-flight guard
//!
//! At most one in-flight handler per key on an engine. Excess events are not
//! queued; they fail the guard's mid-handler and count as non-matches.

use std::hash::Hash;
use std::sync::Arc;

use nano_cache::InFlightSet;

use super::{Engine, Rule};
use crate::context::Ctx;

/// State key under which the claimed key is stashed
pub const SINGLE_KEY: &str = "__single-key__";

type KeyFn<K> = dyn Fn(&Ctx) -> K + Send + Sync;
type RejectFn = dyn Fn(&Ctx) + Send + Sync;

/// Guard built from a key function and an optional rejection callback
pub struct SingleFlight<K: Eq + Hash> {
    key_fn: Arc<KeyFn<K>>,
    on_rejected: Option<Arc<RejectFn>>,
    in_flight: Arc<InFlightSet<K>>,
}

impl<K> SingleFlight<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new<F>(key_fn: F) -> Self
    where
        F: Fn(&Ctx) -> K + Send + Sync + 'static,
    {
        Self {
            key_fn: Arc::new(key_fn),
            on_rejected: None,
            in_flight: Arc::new(InFlightSet::new()),
        }
    }

    /// Called for every event rejected because its key is in flight
    #[must_use]
    pub fn on_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(&Ctx) + Send + Sync + 'static,
    {
        self.on_rejected = Some(Arc::new(f));
        self
    }

    pub fn in_flight(&self) -> &Arc<InFlightSet<K>> {
        &self.in_flight
    }

    /// Install the guard on an engine as a mid-handler and a post-handler
    pub fn apply(&self, engine: &Engine) {
        let key_fn = Arc::clone(&self.key_fn);
        let on_rejected = self.on_rejected.clone();
        let in_flight = Arc::clone(&self.in_flight);
        engine.use_mid_handler(Rule::new(move |ctx| {
            let key = key_fn(ctx);
            if !in_flight.try_acquire(key.clone()) {
                if let Some(rejected) = &on_rejected {
                    rejected(ctx);
                }
                return false;
            }
            ctx.state.insert(SINGLE_KEY, key);
            true
        }));

        let in_flight = Arc::clone(&self.in_flight);
        engine.use_post_handler(move |ctx| {
            if let Some(key) = ctx.state.get::<K>(SINGLE_KEY).cloned() {
                in_flight.release(&key);
                ctx.state.remove(SINGLE_KEY);
            }
        });
    }
}
