//! Typed dispatch payloads
//!
//! Each event type decodes its `d` field into one variant of [`EventData`].

use nano_core::{
    AudioAction, AudioLiveChannelUsersChange, Channel, ForumAuditResult, Guild, Member, Message,
    MessageAudited, MessageDelete, MessageReaction, Post, Reply, Thread,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::EventType;
use crate::protocol::ReadyPayload;

/// Payload of the open forum thread/post/reply events
///
/// Open forums only announce where something happened, not its content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenForumEvent {
    pub guild_id: String,
    pub channel_id: String,
    pub author_id: String,
}

/// Decoded dispatch payload
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    Ready(ReadyPayload),
    Resumed,
    Guild(Guild),
    Channel(Channel),
    Member(Member),
    Message(Message),
    MessageDelete(MessageDelete),
    Reaction(MessageReaction),
    Audit(MessageAudited),
    Audio(AudioAction),
    AudioMember(AudioLiveChannelUsersChange),
    ForumThread(Thread),
    ForumPost(Post),
    ForumReply(Reply),
    ForumAudit(ForumAuditResult),
    OpenForum(OpenForumEvent),
}

impl EventData {
    /// Decode the payload of a dispatch with the given type
    pub fn decode(ty: EventType, d: Value) -> Result<Self, serde_json::Error> {
        use EventType as T;

        let data = match ty {
            T::Ready => Self::Ready(serde_json::from_value(d)?),
            T::Resumed => Self::Resumed,
            T::GuildCreate | T::GuildUpdate | T::GuildDelete => Self::Guild(serde_json::from_value(d)?),
            T::ChannelCreate | T::ChannelUpdate | T::ChannelDelete => {
                Self::Channel(serde_json::from_value(d)?)
            }
            T::GuildMemberAdd | T::GuildMemberUpdate | T::GuildMemberRemove => {
                Self::Member(serde_json::from_value(d)?)
            }
            T::MessageCreate
            | T::AtMessageCreate
            | T::DirectMessageCreate
            | T::GroupAtMessageCreate
            | T::C2cMessageCreate => {
                let mut message: Message = serde_json::from_value(d)?;
                normalize_qq_message(ty, &mut message);
                Self::Message(message)
            }
            T::MessageDelete | T::PublicMessageDelete | T::DirectMessageDelete => {
                Self::MessageDelete(serde_json::from_value(d)?)
            }
            T::MessageReactionAdd | T::MessageReactionRemove => {
                Self::Reaction(serde_json::from_value(d)?)
            }
            T::MessageAuditPass | T::MessageAuditReject => Self::Audit(serde_json::from_value(d)?),
            T::AudioStart | T::AudioFinish | T::AudioOnMic | T::AudioOffMic => {
                Self::Audio(serde_json::from_value(d)?)
            }
            T::AudioOrLiveChannelMemberEnter | T::AudioOrLiveChannelMemberExit => {
                Self::AudioMember(serde_json::from_value(d)?)
            }
            T::ForumThreadCreate | T::ForumThreadUpdate | T::ForumThreadDelete => {
                Self::ForumThread(serde_json::from_value(d)?)
            }
            T::ForumPostCreate | T::ForumPostDelete => Self::ForumPost(serde_json::from_value(d)?),
            T::ForumReplyCreate | T::ForumReplyDelete => Self::ForumReply(serde_json::from_value(d)?),
            T::ForumPublishAuditResult => Self::ForumAudit(serde_json::from_value(d)?),
            T::OpenForumThreadCreate
            | T::OpenForumThreadUpdate
            | T::OpenForumThreadDelete
            | T::OpenForumPostCreate
            | T::OpenForumPostDelete
            | T::OpenForumReplyCreate
            | T::OpenForumReplyDelete => Self::OpenForum(serde_json::from_value(d)?),
        };
        Ok(data)
    }

    /// The message carried by a message or message-delete event
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            Self::MessageDelete(deleted) => Some(&deleted.message),
            _ => None,
        }
    }

    #[must_use]
    pub fn message_mut(&mut self) -> Option<&mut Message> {
        match self {
            Self::Message(message) => Some(message),
            Self::MessageDelete(deleted) => Some(&mut deleted.message),
            _ => None,
        }
    }
}

/// QQ group and c2c messages identify the chat and sender by open ids
///
/// Fold them into `channel_id` and `author.id` so replies and session checks
/// work the same way as for guild messages.
fn normalize_qq_message(ty: EventType, message: &mut Message) {
    let Some(author) = message.author.as_mut() else {
        return;
    };
    match ty {
        EventType::GroupAtMessageCreate => {
            if author.id.is_empty() {
                author.id.clone_from(&author.member_openid);
            }
            if message.channel_id.is_empty() {
                message.channel_id.clone_from(&message.group_openid);
            }
        }
        EventType::C2cMessageCreate => {
            if author.id.is_empty() {
                author.id.clone_from(&author.user_openid);
            }
            if message.channel_id.is_empty() {
                message.channel_id.clone_from(&author.id);
            }
        }
        _ => {}
    }
}
