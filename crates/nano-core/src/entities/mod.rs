//! Platform entities carried in gateway dispatches and REST responses

mod audio;
mod channel;
mod forum;
mod guild;
mod member;
mod message;
mod reaction;
mod timestamp;
mod user;

pub use audio::{AudioAction, AudioLiveChannelUsersChange};
pub use channel::{Channel, ChannelType};
pub use forum::{ForumAuditResult, Post, PostInfo, Reply, ReplyInfo, Thread, ThreadInfo};
pub use guild::Guild;
pub use member::{roles, Member};
pub use message::{
    Message, MessageAttachment, MessageAudited, MessageDelete, MessageEmbed, MessageReference,
};
pub use reaction::{Emoji, MessageReaction, ReactionTarget};
pub use user::User;
