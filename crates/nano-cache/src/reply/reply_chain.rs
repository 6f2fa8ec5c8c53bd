//! Reply chains.
//!
//! Maps an inbound message id to the ids of the replies the bot has sent for
//! it, in send order. QQ group and c2c replies must carry a per-source
//! sequence number, which is derived from the chain length.

use std::time::Duration;

use crate::ttl::TtlCache;

/// Reply chain lifetime (5 minutes)
pub const REPLY_CHAIN_TTL: Duration = Duration::from_secs(300);

/// Source message id -> reply ids, expiring five minutes after the last reply
#[derive(Debug)]
pub struct ReplyChainCache {
    chains: TtlCache<String, Vec<String>>,
}

impl Default for ReplyChainCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyChainCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(REPLY_CHAIN_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            chains: TtlCache::new(ttl),
        }
    }

    /// Append `reply_id` to the chain of `source_id`
    pub fn log_reply(&self, source_id: &str, reply_id: &str) {
        let reply = reply_id.to_string();
        let chain = self.chains.update(source_id.to_string(), move |chain| {
            let mut chain = chain.unwrap_or_default();
            chain.push(reply);
            chain
        });
        tracing::trace!(source_id, reply_id, len = chain.len(), "Reply logged");
    }

    /// Replies produced so far for `source_id`, oldest first
    pub fn replies(&self, source_id: &str) -> Vec<String> {
        self.chains
            .get(&source_id.to_string())
            .unwrap_or_default()
    }

    /// Sequence number for the next reply to `source_id` (1-based)
    pub fn next_seq(&self, source_id: &str) -> u32 {
        self.replies(source_id).len() as u32 + 1
    }
}
