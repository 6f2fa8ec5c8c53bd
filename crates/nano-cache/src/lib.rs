//! # nano-cache
//!
//! In-process caches shared by every dispatcher task.
//!
//! ## Features
//!
//! - **TTL cache**: generic key/value map whose entries expire a fixed time after their last write
//! - **Reply chains**: which replies each inbound message has produced, kept for five minutes
//! - **In-flight keys**: lock-free claim/release set backing the single-flight guard
//!
//! ## Example
//!
//! ```ignore
//! use nano_cache::{InFlightSet, ReplyChainCache};
//!
//! let replies = ReplyChainCache::new();
//! replies.log_reply("m1", "r1");
//! assert_eq!(replies.next_seq("m1"), 2);
//!
//! let flights = InFlightSet::new();
//! assert!(flights.try_acquire("user-1"));
//! assert!(!flights.try_acquire("user-1"));
//! flights.release(&"user-1");
//! ```

pub mod flight;
pub mod reply;
pub mod ttl;

pub use flight::InFlightSet;
pub use reply::{ReplyChainCache, REPLY_CHAIN_TTL};
pub use ttl::TtlCache;
