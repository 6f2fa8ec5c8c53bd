//! Reply-chain bookkeeping

mod reply_chain;

pub use reply_chain::{ReplyChainCache, REPLY_CHAIN_TTL};
