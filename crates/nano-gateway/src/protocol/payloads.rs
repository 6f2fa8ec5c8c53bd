//! Payload definitions carried in the `d` field of an envelope

use nano_core::{Intents, User};
use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Interval the platform announces by default (45 seconds)
    pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 45_000;

    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::with_interval(Self::DEFAULT_HEARTBEAT_INTERVAL)
    }
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Authorization string, `Bot {app_id}.{token}`
    pub token: String,
    pub intents: Intents,
    /// `[shard_index, shard_count]`
    pub shard: [u32; 2],
    #[serde(default)]
    pub properties: IdentifyProperties,
}

/// Client properties announced at identify time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    #[serde(rename = "$os")]
    pub os: String,
    #[serde(rename = "$browser")]
    pub browser: String,
    #[serde(rename = "$device")]
    pub device: String,
}

impl IdentifyProperties {
    /// Properties describing this client build
    #[must_use]
    pub fn new() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: concat!("nano-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
            device: String::new(),
        }
    }

    /// Set browser
    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    /// Set device type
    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self::new()
    }
}

/// Payload for op 6 (Resume)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    /// Last sequence number seen before the socket dropped
    pub seq: u64,
}

/// Payload of the READY dispatch that completes an identify
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadyPayload {
    pub version: u32,
    pub session_id: String,
    /// The bot's own account
    pub user: User,
    pub shard: [u32; 2],
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hello_payload() {
        assert_eq!(HelloPayload::default().heartbeat_interval, 45_000);
        let hello: HelloPayload = serde_json::from_value(json!({"heartbeat_interval": 41250})).unwrap();
        assert_eq!(hello, HelloPayload::with_interval(41_250));
    }

    #[test]
    fn test_identify_payload_serialization() {
        let payload = IdentifyPayload {
            token: "Bot 1.abc".to_string(),
            intents: Intents::GUILDS | Intents::DIRECT_MESSAGE,
            shard: [0, 1],
            properties: IdentifyProperties::new().with_browser("test").with_device("vm"),
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["token"], "Bot 1.abc");
        assert_eq!(value["intents"], (1 << 0) | (1 << 12));
        assert_eq!(value["shard"], json!([0, 1]));
        assert_eq!(value["properties"]["$browser"], "test");
        assert_eq!(value["properties"]["$device"], "vm");
        assert!(value["properties"]["$os"].is_string());
    }

    #[test]
    fn test_resume_payload_serialization() {
        let payload = ResumePayload {
            token: "Bot 1.abc".to_string(),
            session_id: "session456".to_string(),
            seq: 42,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value, json!({"token": "Bot 1.abc", "session_id": "session456", "seq": 42}));
    }

    #[test]
    fn test_ready_payload() {
        let ready: ReadyPayload = serde_json::from_value(json!({
            "version": 1,
            "session_id": "s-1",
            "user": {"id": "99", "username": "nano", "bot": true},
            "shard": [0, 1]
        }))
        .unwrap();

        assert_eq!(ready.session_id, "s-1");
        assert_eq!(ready.user.username, "nano");
        assert!(ready.user.is_bot());
        assert_eq!(ready.shard, [0, 1]);
    }
}
