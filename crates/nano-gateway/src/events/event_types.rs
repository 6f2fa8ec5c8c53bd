//! Gateway event types
//!
//! Every dispatch tag the gateway sends in the `t` field, and the logical
//! kind matchers subscribe to.

use std::fmt;

macro_rules! event_types {
    ($($variant:ident => $wire:literal, $name:literal;)*) => {
        /// Dispatch event types
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EventType {
            $($variant,)*
        }

        impl EventType {
            /// Every known event type, in declaration order
            pub const ALL: &'static [EventType] = &[$(Self::$variant,)*];

            /// Wire tag, e.g. `AT_MESSAGE_CREATE`
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)*
                }
            }

            /// CamelCase name, e.g. `AtMessageCreate`
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// Parse a wire tag; unknown tags give `None`
            #[must_use]
            pub fn from_wire(tag: &str) -> Option<Self> {
                match tag {
                    $($wire => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

event_types! {
    Ready => "READY", "Ready";
    Resumed => "RESUMED", "Resumed";

    GuildCreate => "GUILD_CREATE", "GuildCreate";
    GuildUpdate => "GUILD_UPDATE", "GuildUpdate";
    GuildDelete => "GUILD_DELETE", "GuildDelete";

    ChannelCreate => "CHANNEL_CREATE", "ChannelCreate";
    ChannelUpdate => "CHANNEL_UPDATE", "ChannelUpdate";
    ChannelDelete => "CHANNEL_DELETE", "ChannelDelete";

    GuildMemberAdd => "GUILD_MEMBER_ADD", "GuildMemberAdd";
    GuildMemberUpdate => "GUILD_MEMBER_UPDATE", "GuildMemberUpdate";
    GuildMemberRemove => "GUILD_MEMBER_REMOVE", "GuildMemberRemove";

    MessageCreate => "MESSAGE_CREATE", "MessageCreate";
    MessageDelete => "MESSAGE_DELETE", "MessageDelete";
    MessageReactionAdd => "MESSAGE_REACTION_ADD", "MessageReactionAdd";
    MessageReactionRemove => "MESSAGE_REACTION_REMOVE", "MessageReactionRemove";
    DirectMessageCreate => "DIRECT_MESSAGE_CREATE", "DirectMessageCreate";
    DirectMessageDelete => "DIRECT_MESSAGE_DELETE", "DirectMessageDelete";
    AtMessageCreate => "AT_MESSAGE_CREATE", "AtMessageCreate";
    PublicMessageDelete => "PUBLIC_MESSAGE_DELETE", "PublicMessageDelete";
    GroupAtMessageCreate => "GROUP_AT_MESSAGE_CREATE", "GroupAtMessageCreate";
    C2cMessageCreate => "C2C_MESSAGE_CREATE", "C2cMessageCreate";

    MessageAuditPass => "MESSAGE_AUDIT_PASS", "MessageAuditPass";
    MessageAuditReject => "MESSAGE_AUDIT_REJECT", "MessageAuditReject";

    AudioStart => "AUDIO_START", "AudioStart";
    AudioFinish => "AUDIO_FINISH", "AudioFinish";
    AudioOnMic => "AUDIO_ON_MIC", "AudioOnMic";
    AudioOffMic => "AUDIO_OFF_MIC", "AudioOffMic";
    AudioOrLiveChannelMemberEnter => "AUDIO_OR_LIVE_CHANNEL_MEMBER_ENTER", "AudioOrLiveChannelMemberEnter";
    AudioOrLiveChannelMemberExit => "AUDIO_OR_LIVE_CHANNEL_MEMBER_EXIT", "AudioOrLiveChannelMemberExit";

    ForumThreadCreate => "FORUM_THREAD_CREATE", "ForumThreadCreate";
    ForumThreadUpdate => "FORUM_THREAD_UPDATE", "ForumThreadUpdate";
    ForumThreadDelete => "FORUM_THREAD_DELETE", "ForumThreadDelete";
    ForumPostCreate => "FORUM_POST_CREATE", "ForumPostCreate";
    ForumPostDelete => "FORUM_POST_DELETE", "ForumPostDelete";
    ForumReplyCreate => "FORUM_REPLY_CREATE", "ForumReplyCreate";
    ForumReplyDelete => "FORUM_REPLY_DELETE", "ForumReplyDelete";
    ForumPublishAuditResult => "FORUM_PUBLISH_AUDIT_RESULT", "ForumPublishAuditResult";

    OpenForumThreadCreate => "OPEN_FORUM_THREAD_CREATE", "OpenForumThreadCreate";
    OpenForumThreadUpdate => "OPEN_FORUM_THREAD_UPDATE", "OpenForumThreadUpdate";
    OpenForumThreadDelete => "OPEN_FORUM_THREAD_DELETE", "OpenForumThreadDelete";
    OpenForumPostCreate => "OPEN_FORUM_POST_CREATE", "OpenForumPostCreate";
    OpenForumPostDelete => "OPEN_FORUM_POST_DELETE", "OpenForumPostDelete";
    OpenForumReplyCreate => "OPEN_FORUM_REPLY_CREATE", "OpenForumReplyCreate";
    OpenForumReplyDelete => "OPEN_FORUM_REPLY_DELETE", "OpenForumReplyDelete";
}

impl EventType {
    /// Logical kind used to look up matchers
    #[must_use]
    pub const fn kind(self) -> EventKind {
        match self {
            Self::MessageCreate
            | Self::AtMessageCreate
            | Self::DirectMessageCreate
            | Self::GroupAtMessageCreate
            | Self::C2cMessageCreate => EventKind::Message,
            Self::MessageDelete | Self::PublicMessageDelete | Self::DirectMessageDelete => {
                EventKind::MessageDelete
            }
            other => EventKind::Event(other),
        }
    }

    /// Direct messages are always addressed to the bot
    #[must_use]
    pub const fn is_direct(self) -> bool {
        matches!(self, Self::DirectMessageCreate | Self::DirectMessageDelete)
    }

    /// QQ group and c2c messages, as opposed to guild messages
    #[must_use]
    pub const fn is_qq(self) -> bool {
        matches!(self, Self::GroupAtMessageCreate | Self::C2cMessageCreate)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical event kind
///
/// The five message-create tags collapse to `Message` and the three
/// message-delete tags to `MessageDelete`; every other tag is its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Message,
    MessageDelete,
    Event(EventType),
}

impl EventKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Message => "Message",
            Self::MessageDelete => "MessageDelete",
            Self::Event(ty) => ty.name(),
        }
    }
}

impl From<EventType> for EventKind {
    fn from(ty: EventType) -> Self {
        ty.kind()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
