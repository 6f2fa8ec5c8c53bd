//! Reaction entity - an emoji reaction on a message or forum item

use serde::{Deserialize, Serialize};

/// Emoji reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emoji {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u32,
}

/// What a reaction was attached to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionTarget {
    pub id: String,
    /// 0 message, 1 thread, 2 post, 3 reply
    #[serde(rename = "type")]
    pub kind: u32,
}

/// Payload of the reaction add/remove dispatches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageReaction {
    pub user_id: String,
    pub guild_id: String,
    pub channel_id: String,
    pub target: ReactionTarget,
    pub emoji: Emoji,
}

impl MessageReaction {
    /// Check if reaction uses a specific emoji
    #[inline]
    pub fn is_emoji(&self, emoji_id: &str) -> bool {
        self.emoji.id == emoji_id
    }
}
