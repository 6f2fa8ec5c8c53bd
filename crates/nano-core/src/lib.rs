//! # nano-core
//!
//! Platform model shared by the gateway client: the entities carried in
//! dispatch payloads, the intents bitmask declared at identify time, and the
//! text helpers used to compare and render message content.
//! This crate has no dependency on the transport or the runtime.

pub mod entities;
pub mod text;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AudioAction, AudioLiveChannelUsersChange, Channel, ChannelType, Emoji, ForumAuditResult, Guild, Member,
    Message, MessageAttachment, MessageAudited, MessageDelete, MessageEmbed, MessageReaction,
    MessageReference, Post, PostInfo, ReactionTarget, Reply, ReplyInfo, Thread, ThreadInfo, User,
};
pub use text::{digest_id, message_escape, message_unescape, underline_to_camel};
pub use value_objects::{Intents, IntentsParseError};
