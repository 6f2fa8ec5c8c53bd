//! Fixtures shared by the unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use nano_common::BotConfig;
use nano_core::{Member, Message, MessageDelete, User};
use parking_lot::Mutex;

use crate::api::{ApiError, ApiResult, MessagePost, OpenApi, ReplyTarget, SentMessage, ShardGateway};
use crate::bot::Bot;
use crate::connection::Session;
use crate::context::{Ctx, Event};
use crate::events::{EventData, EventKind, EventType};

/// Id configured as the only super user of test bots
pub(crate) const SUPER_USER: &str = "1000";

/// Outbound API that records replies instead of sending them
#[derive(Default)]
pub(crate) struct StubApi {
    replies: Mutex<Vec<(ReplyTarget, MessagePost)>>,
    members: Mutex<Vec<Member>>,
    fail: AtomicBool,
    gateway_calls: AtomicUsize,
}

impl StubApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_replies(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn add_member(&self, guild_id: &str, mut member: Member) {
        member.guild_id = guild_id.to_string();
        self.members.lock().push(member);
    }

    pub(crate) fn replies(&self) -> Vec<(ReplyTarget, MessagePost)> {
        self.replies.lock().clone()
    }

    pub(crate) fn last_reply(&self) -> Option<(ReplyTarget, MessagePost)> {
        self.replies.lock().last().cloned()
    }

    /// Reply texts in sending order
    pub(crate) fn texts(&self) -> Vec<String> {
        self.replies.lock().iter().map(|(_, p)| p.content.clone()).collect()
    }

    pub(crate) fn gateway_calls(&self) -> usize {
        self.gateway_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OpenApi for StubApi {
    async fn fetch_gateway_url(&self) -> ApiResult<String> {
        self.gateway_calls.fetch_add(1, Ordering::SeqCst);
        Ok("ws://stub.invalid/websocket".to_string())
    }

    async fn fetch_shard_gateway(&self) -> ApiResult<ShardGateway> {
        Ok(ShardGateway {
            url: "ws://stub.invalid/websocket".to_string(),
            shards: 1,
            ..ShardGateway::default()
        })
    }

    async fn send_reply(&self, target: &ReplyTarget, post: &MessagePost) -> ApiResult<SentMessage> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::status(500, 0, "stub failure"));
        }
        let mut replies = self.replies.lock();
        replies.push((target.clone(), post.clone()));
        Ok(SentMessage {
            id: format!("r{}", replies.len()),
        })
    }

    async fn fetch_member(&self, guild_id: &str, user_id: &str) -> ApiResult<Member> {
        self.members
            .lock()
            .iter()
            .find(|m| m.guild_id == guild_id && m.user.as_ref().is_some_and(|u| u.id == user_id))
            .cloned()
            .ok_or_else(|| ApiError::status(404, 50001, "member not found"))
    }
}

pub(crate) fn stub_bot(api: Arc<StubApi>) -> Arc<Bot> {
    let mut config = BotConfig::new("1", "token");
    config.super_users = vec![SUPER_USER.to_string()];
    Bot::builder(config)
        .api(api)
        .build()
        .expect("stub bot builds without network")
}

/// Session of a fresh stub bot, not connected
pub(crate) fn stub_session() -> (Arc<Session>, Arc<StubApi>) {
    let api = Arc::new(StubApi::new());
    let session = Session::new(stub_bot(Arc::clone(&api)), [0, 1]);
    (session, api)
}

pub(crate) fn test_session() -> Arc<Session> {
    stub_session().0
}

/// Message `m1` from alice (id 7) in channel 100 of guild 200
pub(crate) fn message(content: &str) -> Message {
    let mut message = Message::new("m1", "100", User::new("7", "alice"), content);
    message.guild_id = "200".to_string();
    message
}

fn event(ty: EventType, content: &str) -> Event {
    let data = if ty.kind() == EventKind::MessageDelete {
        EventData::MessageDelete(MessageDelete {
            message: message(content),
            op_user: User::new("7", "alice"),
        })
    } else {
        EventData::Message(message(content))
    };
    Event::new(ty, Some(1), data)
}

/// Context of a message event on its own stub bot
pub(crate) fn message_ctx(ty: EventType, content: &str) -> Ctx {
    Ctx::new(test_session(), event(ty, content))
}

/// Like [`message_ctx`], also returning the bot's stub API
pub(crate) fn stub_ctx(ty: EventType, content: &str) -> (Ctx, Arc<StubApi>) {
    let (session, api) = stub_session();
    (Ctx::new(session, event(ty, content)), api)
}

/// Context of a message event on an existing session
pub(crate) fn session_ctx(session: &Arc<Session>, ty: EventType, content: &str) -> Ctx {
    Ctx::new(Arc::clone(session), event(ty, content))
}
