//! Message entity - a chat message and the objects hanging off it

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{Member, User};

/// A message delivered by a message-create dispatch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub guild_id: String,
    pub content: String,
    #[serde(with = "super::timestamp")]
    pub timestamp: Option<DateTime<FixedOffset>>,
    #[serde(with = "super::timestamp")]
    pub edited_timestamp: Option<DateTime<FixedOffset>>,
    pub mention_everyone: bool,
    pub author: Option<User>,
    pub attachments: Vec<MessageAttachment>,
    pub embeds: Vec<MessageEmbed>,
    pub member: Option<Member>,
    pub seq_in_channel: String,
    pub message_reference: Option<MessageReference>,
    pub src_guild_id: String,
    /// Set on QQ group messages only
    pub group_openid: String,
}

impl Message {
    /// Create a text message in a channel
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        author: User,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            author: Some(author),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Id of the author, empty when the payload carried none
    pub fn author_id(&self) -> &str {
        self.author.as_ref().map_or("", |a| a.id.as_str())
    }

    /// Id of the message this one replies to
    pub fn reply_target(&self) -> Option<&str> {
        self.message_reference
            .as_ref()
            .map(|r| r.message_id.as_str())
            .filter(|id| !id.is_empty())
    }

    /// Check if message has attachments
    #[inline]
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, id) = self
            .author
            .as_ref()
            .map_or(("", ""), |a| (a.username.as_str(), a.id.as_str()));
        write!(
            f,
            "guild: {}, channel: {}, user: {name}({id}), content: {}",
            self.guild_id, self.channel_id, self.content
        )
    }
}

/// A file or image attached to a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAttachment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filename: String,
    pub height: u32,
    pub width: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub size: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl MessageAttachment {
    /// Whether the attachment is an image, judged by its content type
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Embed block rendered under a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEmbed {
    pub title: String,
    pub prompt: String,
    pub thumbnail: Option<EmbedThumbnail>,
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedField {
    pub name: String,
}

/// Quoted-reply reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageReference {
    pub message_id: String,
    pub ignore_get_message_error: bool,
}

impl MessageReference {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            ignore_get_message_error: false,
        }
    }
}

/// Payload of a message-delete dispatch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageDelete {
    pub message: Message,
    pub op_user: User,
}

/// Payload of the message audit pass/reject dispatches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAudited {
    pub audit_id: String,
    #[serde(with = "super::timestamp")]
    pub audit_time: Option<DateTime<FixedOffset>>,
    pub channel_id: String,
    #[serde(with = "super::timestamp")]
    pub create_time: Option<DateTime<FixedOffset>>,
    pub guild_id: String,
    pub message_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_at_message() {
        let json = r#"{
            "id": "m1",
            "channel_id": "100",
            "guild_id": "200",
            "content": "<@!99> hello",
            "timestamp": "2021-11-23T15:16:48+08:00",
            "edited_timestamp": "",
            "author": {"id": "7", "username": "alice"},
            "member": {"roles": ["1"], "joined_at": "2021-11-23T15:16:48+08:00"},
            "seq_in_channel": "3"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.author_id(), "7");
        assert!(msg.timestamp.is_some());
        assert!(msg.edited_timestamp.is_none());
        assert!(!msg.has_attachments());
        assert!(msg.reply_target().is_none());
    }

    #[test]
    fn test_reply_target() {
        let mut msg = Message::new("m2", "100", User::new("7", "alice"), "hi");
        msg.message_reference = Some(MessageReference::new("m1"));
        assert_eq!(msg.reply_target(), Some("m1"));

        msg.message_reference = Some(MessageReference::default());
        assert!(msg.reply_target().is_none());
    }

    #[test]
    fn test_decode_message_delete() {
        let json = r#"{
            "message": {"id": "m1", "guild_id": "200", "author": {"id": "7"}},
            "op_user": {"id": "8"}
        }"#;
        let del: MessageDelete = serde_json::from_str(json).unwrap();
        assert_eq!(del.message.author_id(), "7");
        assert_eq!(del.op_user.id, "8");
    }

    #[test]
    fn test_display_message() {
        let mut msg = Message::new("m1", "100", User::new("7", "alice"), "hi");
        msg.guild_id = "200".to_string();
        assert_eq!(
            msg.to_string(),
            "guild: 200, channel: 100, user: alice(7), content: hi"
        );
    }
}
