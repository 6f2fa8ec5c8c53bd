//! Audio channel payloads

use serde::{Deserialize, Serialize};

/// Payload of the audio start/finish/on-mic/off-mic dispatches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioAction {
    pub channel_id: String,
    pub guild_id: String,
    pub audio_url: String,
    pub text: String,
}

/// Payload of the audio-or-live channel member enter/exit dispatches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioLiveChannelUsersChange {
    pub guild_id: String,
    pub channel_id: String,
    pub channel_type: i32,
    pub user_id: String,
}
