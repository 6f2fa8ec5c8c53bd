//! Static callback table
//!
//! An explicit mapping from event type to a typed callback, built once at
//! startup. When a bot carries a table, dispatches go here and never reach
//! the matcher engine.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use nano_core::{
    AudioAction, AudioLiveChannelUsersChange, Channel, ForumAuditResult, Guild, Member, Message,
    MessageAudited, MessageDelete, MessageReaction, Post, Reply, Thread,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::connection::Session;
use crate::events::{EventType, OpenForumEvent};

type Callback = Arc<dyn Fn(Option<u64>, Arc<Session>, Value) -> Option<BoxFuture<'static, ()>> + Send + Sync>;

/// Typed callbacks keyed by event type
#[derive(Default, Clone)]
pub struct CallbackTable {
    slots: HashMap<EventType, Callback>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the callback for `ty`, decoding its payload into `T`
    ///
    /// A later call for the same type replaces the slot.
    pub fn on<T, F, Fut>(mut self, ty: EventType, f: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(Option<u64>, Arc<Session>, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callback: Callback = Arc::new(
            move |seq: Option<u64>, session: Arc<Session>, payload: Value| -> Option<BoxFuture<'static, ()>> {
                match serde_json::from_value::<T>(payload) {
                    Ok(value) => {
                        let task: BoxFuture<'static, ()> = Box::pin(f(seq, session, value));
                        Some(task)
                    }
                    Err(e) => {
                        tracing::warn!(event_type = %ty, error = %e, "Undecodable event payload, dropped");
                        None
                    }
                }
            },
        );
        self.slots.insert(ty, callback);
        self
    }

    pub fn contains(&self, ty: EventType) -> bool {
        self.slots.contains_key(&ty)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Decode `payload` and run the callback for `ty` on its own task
    ///
    /// Returns whether a callback ran.
    pub fn invoke(&self, ty: EventType, seq: Option<u64>, session: &Arc<Session>, payload: Value) -> bool {
        let Some(callback) = self.slots.get(&ty) else {
            tracing::debug!(event_type = %ty, "No callback installed, dropped");
            return false;
        };
        let Some(task) = callback(seq, Arc::clone(session), payload) else {
            return false;
        };
        tracing::debug!(event_type = %ty, seq = ?seq, "Routing event to callback");
        tokio::spawn(task);
        true
    }
}

impl std::fmt::Debug for CallbackTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackTable")
            .field("slots", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

macro_rules! callback_slots {
    ($($method:ident => $variant:ident($payload:ty);)*) => {
        impl CallbackTable {
            $(
                #[doc = concat!("Callback for `", stringify!($variant), "`")]
                pub fn $method<F, Fut>(self, f: F) -> Self
                where
                    F: Fn(Option<u64>, Arc<Session>, $payload) -> Fut + Send + Sync + 'static,
                    Fut: Future<Output = ()> + Send + 'static,
                {
                    self.on::<$payload, _, _>(EventType::$variant, f)
                }
            )*
        }
    };
}

callback_slots! {
    on_guild_create => GuildCreate(Guild);
    on_guild_update => GuildUpdate(Guild);
    on_guild_delete => GuildDelete(Guild);
    on_channel_create => ChannelCreate(Channel);
    on_channel_update => ChannelUpdate(Channel);
    on_channel_delete => ChannelDelete(Channel);

    on_guild_member_add => GuildMemberAdd(Member);
    on_guild_member_update => GuildMemberUpdate(Member);
    on_guild_member_remove => GuildMemberRemove(Member);

    on_message_create => MessageCreate(Message);
    on_message_delete => MessageDelete(MessageDelete);
    on_message_reaction_add => MessageReactionAdd(MessageReaction);
    on_message_reaction_remove => MessageReactionRemove(MessageReaction);
    on_direct_message_create => DirectMessageCreate(Message);
    on_direct_message_delete => DirectMessageDelete(MessageDelete);
    on_at_message_create => AtMessageCreate(Message);
    on_public_message_delete => PublicMessageDelete(MessageDelete);
    on_group_at_message_create => GroupAtMessageCreate(Message);
    on_c2c_message_create => C2cMessageCreate(Message);

    on_message_audit_pass => MessageAuditPass(MessageAudited);
    on_message_audit_reject => MessageAuditReject(MessageAudited);

    on_audio_start => AudioStart(AudioAction);
    on_audio_finish => AudioFinish(AudioAction);
    on_audio_on_mic => AudioOnMic(AudioAction);
    on_audio_off_mic => AudioOffMic(AudioAction);
    on_audio_or_live_channel_member_enter => AudioOrLiveChannelMemberEnter(AudioLiveChannelUsersChange);
    on_audio_or_live_channel_member_exit => AudioOrLiveChannelMemberExit(AudioLiveChannelUsersChange);

    on_forum_thread_create => ForumThreadCreate(Thread);
    on_forum_thread_update => ForumThreadUpdate(Thread);
    on_forum_thread_delete => ForumThreadDelete(Thread);
    on_forum_post_create => ForumPostCreate(Post);
    on_forum_post_delete => ForumPostDelete(Post);
    on_forum_reply_create => ForumReplyCreate(Reply);
    on_forum_reply_delete => ForumReplyDelete(Reply);
    on_forum_publish_audit_result => ForumPublishAuditResult(ForumAuditResult);

    on_open_forum_thread_create => OpenForumThreadCreate(OpenForumEvent);
    on_open_forum_thread_update => OpenForumThreadUpdate(OpenForumEvent);
    on_open_forum_thread_delete => OpenForumThreadDelete(OpenForumEvent);
    on_open_forum_post_create => OpenForumPostCreate(OpenForumEvent);
    on_open_forum_post_delete => OpenForumPostDelete(OpenForumEvent);
    on_open_forum_reply_create => OpenForumReplyCreate(OpenForumEvent);
    on_open_forum_reply_delete => OpenForumReplyDelete(OpenForumEvent);
}
