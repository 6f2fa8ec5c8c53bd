//! Keyed rate limits
//!
//! Each key gets its own bucket of `burst` cells refilled evenly over
//! `period`. Backed by `governor`'s keyed limiter.

use std::hash::Hash;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::context::Ctx;
use crate::matcher::Rule;

/// Rate limiters keyed by a value derived from the context
pub struct LimiterManager<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    limiter: Arc<DefaultKeyedRateLimiter<K>>,
}

impl<K> LimiterManager<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    /// Allow `burst` events per key every `period`
    pub fn new(period: Duration, burst: NonZeroU32) -> Self {
        let per_cell = period / burst.get();
        let quota = Quota::with_period(per_cell)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Take one cell from `key`'s bucket
    pub fn check(&self, key: &K) -> bool {
        self.limiter.check_key(key).is_ok()
    }

    /// Drop buckets that are full again
    pub fn shrink(&self) {
        self.limiter.retain_recent();
    }

    /// Rule that fails once the bucket of `key_fn(ctx)` is empty
    pub fn rule<F>(&self, key_fn: F) -> Rule
    where
        F: Fn(&Ctx) -> K + Send + Sync + 'static,
    {
        self.rule_or_else(key_fn, |_| {})
    }

    /// Like [`LimiterManager::rule`], calling `on_limited` when it fails
    pub fn rule_or_else<F, R>(&self, key_fn: F, on_limited: R) -> Rule
    where
        F: Fn(&Ctx) -> K + Send + Sync + 'static,
        R: Fn(&Ctx) + Send + Sync + 'static,
    {
        let limiter = Arc::clone(&self.limiter);
        Rule::new(move |ctx| {
            if limiter.check_key(&key_fn(ctx)).is_ok() {
                return true;
            }
            tracing::debug!(event = ctx.name(), "Rate limited");
            on_limited(ctx);
            false
        })
    }
}

impl<K> Clone for LimiterManager<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

impl<K> std::fmt::Debug for LimiterManager<K>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimiterManager").field("keys", &self.limiter.len()).finish()
    }
}
