//! Request and response bodies of the outbound API

use nano_core::{MessageEmbed, MessageReference};
use serde::{Deserialize, Serialize};

/// Reply id used for passive replies that have no triggering message
pub const NO_SOURCE_MESSAGE: &str = "MESSAGE_CREATE";

/// Body of `GET /gateway`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct GatewayUrl {
    pub url: String,
}

/// Body of `GET /gateway/bot`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardGateway {
    pub url: String,
    /// Recommended shard count
    pub shards: u32,
    pub session_start_limit: SessionStartLimit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStartLimit {
    pub total: u32,
    pub remaining: u32,
    pub reset_after: u64,
    pub max_concurrency: u32,
}

/// `msg_type` values of the v2 (QQ group and c2c) message API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    Text = 0,
    Markdown = 2,
    Ark = 3,
    Embed = 4,
}

impl Serialize for MessageType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// Outbound message body
///
/// The guild API and the v2 API share the fields used here; the v2-only
/// fields (`msg_type`, `msg_seq`) stay unset for guild targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagePost {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Id of the message this post passively replies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Quote of the replied message (guild only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
    /// Image url (guild only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<MessageEmbed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_type: Option<MessageType>,
    /// Ordinal of this reply to the same source message (v2 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_seq: Option<u32>,
}

impl MessagePost {
    /// A plain text post
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Set image url
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    /// Fill `msg_type` from the content carried by the post
    pub(crate) fn infer_v2_type(&mut self) {
        self.msg_type = Some(if self.embed.is_some() {
            MessageType::Embed
        } else {
            MessageType::Text
        });
    }
}

/// Where a reply is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Direct message session, keyed by its guild id
    Direct { guild_id: String },
    /// Guild text channel
    Channel { channel_id: String },
    /// QQ group, keyed by its open id
    Group { group_openid: String },
    /// QQ c2c chat, keyed by the user's open id
    User { openid: String },
}

impl ReplyTarget {
    /// REST path the post goes to
    pub fn path(&self) -> String {
        match self {
            Self::Direct { guild_id } => format!("/dms/{guild_id}/messages"),
            Self::Channel { channel_id } => format!("/channels/{channel_id}/messages"),
            Self::Group { group_openid } => format!("/v2/groups/{group_openid}/messages"),
            Self::User { openid } => format!("/v2/users/{openid}/messages"),
        }
    }

    /// Targets served by the v2 API
    pub fn is_v2(&self) -> bool {
        matches!(self, Self::Group { .. } | Self::User { .. })
    }
}

/// Body returned for a sent message
///
/// The guild API returns a full message, the v2 API only `{id, timestamp}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SentMessage {
    pub id: String,
}
