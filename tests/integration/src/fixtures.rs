//! Test fixtures and data generators
//!
//! Provides reusable gateway payloads for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};

use nano_gateway::protocol::{Envelope, HelloPayload, READY_EVENT};
use serde_json::{json, Value};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// App id every test bot identifies with
pub const APP_ID: &str = "102001";

/// Token every test bot identifies with
pub const TOKEN: &str = "test-token";

/// Id of the bot account announced in READY
pub const BOT_USER_ID: &str = "42";

/// Hello announcing the given heartbeat interval
pub fn hello(interval_ms: u64) -> Envelope {
    Envelope::hello(HelloPayload::with_interval(interval_ms))
}

/// READY dispatch for a fresh session
pub fn ready(session_id: &str, seq: u64) -> Envelope {
    Envelope::dispatch(
        READY_EVENT,
        seq,
        json!({
            "version": 1,
            "session_id": session_id,
            "user": { "id": BOT_USER_ID, "username": "nano", "bot": true },
            "shard": [0, 1],
        }),
    )
}

/// A unique session id
pub fn session_id() -> String {
    format!("session-{}", unique_suffix())
}

/// Body of a guild channel message from user 7
pub fn channel_message(id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "channel_id": "100",
        "guild_id": "200",
        "content": content,
        "author": { "id": "7", "username": "alice" },
    })
}

/// AT_MESSAGE_CREATE mentioning the bot
pub fn at_message(seq: u64, id: &str, text: &str) -> Envelope {
    Envelope::dispatch(
        "AT_MESSAGE_CREATE",
        seq,
        channel_message(id, &format!("<@!{BOT_USER_ID}> {text}")),
    )
}
