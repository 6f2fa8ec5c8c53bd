//! Expiring key/value storage

mod ttl_cache;

pub use ttl_cache::TtlCache;
