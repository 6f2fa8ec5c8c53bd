//! Event context
//!
//! One `Ctx` per dispatched event. It carries the decoded payload through
//! the whole matcher chain, together with the scratch state rules write
//! into and the flags of the matcher being evaluated.

use std::sync::Arc;

use nano_core::{digest_id, Message};

use super::State;
use crate::api::OpenApi;
use crate::bot::Bot;
use crate::connection::Session;
use crate::dispatch::Dispatcher;
use crate::events::{EventData, EventKind, EventType};
use crate::matcher::Matcher;
use crate::protocol::Envelope;

/// A decoded dispatch
#[derive(Debug, Clone)]
pub struct Event {
    pub ty: EventType,
    pub kind: EventKind,
    pub seq: Option<u64>,
    pub data: EventData,
}

impl Event {
    pub fn new(ty: EventType, seq: Option<u64>, data: EventData) -> Self {
        Self {
            ty,
            kind: ty.kind(),
            seq,
            data,
        }
    }
}

/// Private copy of the matcher being evaluated and its flags
#[derive(Clone)]
pub(crate) struct MatcherFrame {
    pub(crate) matcher: Arc<Matcher>,
    pub(crate) block: bool,
    pub(crate) brk: bool,
}

/// Context of one event
#[derive(Clone)]
pub struct Ctx {
    pub event: Event,
    pub state: State,
    /// Whether the message is addressed to the bot
    pub is_to_me: bool,
    /// QQ group or c2c event
    pub is_qq: bool,
    session: Arc<Session>,
    frame: Option<MatcherFrame>,
}

impl Ctx {
    pub fn new(session: Arc<Session>, event: Event) -> Self {
        Self {
            is_to_me: event.ty.is_direct(),
            is_qq: event.ty.is_qq(),
            event,
            state: State::new(),
            session,
            frame: None,
        }
    }

    // === Collaborators ===

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn bot(&self) -> &Arc<Bot> {
        self.session.bot()
    }

    pub fn api(&self) -> &Arc<dyn OpenApi> {
        self.session.bot().api()
    }

    // === Event ===

    pub fn event_type(&self) -> EventType {
        self.event.ty
    }

    pub fn kind(&self) -> EventKind {
        self.event.kind
    }

    /// CamelCase name of the event type, e.g. `AtMessageCreate`
    pub fn name(&self) -> &'static str {
        self.event.ty.name()
    }

    /// Message of a message or message-delete event
    pub fn message(&self) -> Option<&Message> {
        self.event.data.message()
    }

    pub fn message_mut(&mut self) -> Option<&mut Message> {
        self.event.data.message_mut()
    }

    /// Message of a message event; `None` for deletes and everything else
    pub fn text_message(&self) -> Option<&Message> {
        match &self.event.data {
            EventData::Message(message) => Some(message),
            _ => None,
        }
    }

    pub fn text_message_mut(&mut self) -> Option<&mut Message> {
        match &mut self.event.data {
            EventData::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Message content, empty for events without a message
    pub fn plain_text(&self) -> &str {
        self.message().map_or("", |m| m.content.as_str())
    }

    /// Owned copy of the message content
    pub fn message_string(&self) -> String {
        self.plain_text().to_string()
    }

    /// Mention token of the bot: `<@!{id}>`
    pub fn at_me(&self) -> String {
        self.session.at_me()
    }

    // === Channel shape ===

    /// Direct message
    pub fn only_direct(&self) -> bool {
        self.name().starts_with("Direct")
    }

    /// Public guild channel message (the bot was mentioned)
    pub fn only_public(&self) -> bool {
        let name = self.name();
        name.starts_with("At") || name.starts_with("Public")
    }

    pub fn only_private(&self) -> bool {
        !self.only_public()
    }

    pub fn only_qq_group(&self) -> bool {
        self.event.ty == EventType::GroupAtMessageCreate
    }

    pub fn only_qq_private(&self) -> bool {
        self.event.ty == EventType::C2cMessageCreate
    }

    pub fn only_qq(&self) -> bool {
        self.is_qq
    }

    /// Guild side, direct messages included
    pub fn only_guild(&self) -> bool {
        !self.is_qq
    }

    /// Guild text channel
    pub fn only_channel(&self) -> bool {
        !self.only_direct() && !self.is_qq
    }

    // === Ids ===

    /// Numeric id of the chat the event belongs to
    ///
    /// Guild channel ids parse directly; QQ open ids are digested. Zero when
    /// no id can be derived.
    pub fn group_id(&self) -> u64 {
        let Some(message) = self.message() else {
            return 0;
        };
        if self.is_qq {
            return match self.event.ty {
                EventType::GroupAtMessageCreate => digest_id(&message.channel_id),
                EventType::C2cMessageCreate => digest_id(message.author_id()),
                _ => 0,
            };
        }
        message.channel_id.parse().unwrap_or(0)
    }

    /// Numeric id of the sender
    pub fn user_id(&self) -> u64 {
        let Some(message) = self.message() else {
            return 0;
        };
        if self.is_qq {
            return digest_id(message.author_id());
        }
        message.author_id().parse().unwrap_or(0)
    }

    // === Evaluation flags ===

    pub(crate) fn enter(&mut self, matcher: &Arc<Matcher>) {
        self.frame = Some(MatcherFrame {
            matcher: Arc::clone(matcher),
            block: matcher.is_block(),
            brk: matcher.is_break(),
        });
    }

    /// Matcher currently being evaluated
    pub fn matcher(&self) -> Option<&Arc<Matcher>> {
        self.frame.as_ref().map(|f| &f.matcher)
    }

    /// Stop evaluating lower-priority matchers after this one
    pub fn block(&mut self) {
        if let Some(frame) = self.frame.as_mut() {
            frame.block = true;
        }
    }

    /// Abort the whole chain if the current matcher fails
    pub fn break_chain(&mut self) {
        if let Some(frame) = self.frame.as_mut() {
            frame.brk = true;
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.frame.as_ref().is_some_and(|f| f.block)
    }

    pub fn breaks(&self) -> bool {
        self.frame.as_ref().is_some_and(|f| f.brk)
    }

    /// Route an envelope through the dispatcher as if the gateway sent it
    pub fn echo(&self, envelope: Envelope) {
        Dispatcher::route(&self.session, envelope);
    }
}

impl std::fmt::Debug for Ctx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ctx")
            .field("event", &self.event)
            .field("state", &self.state)
            .field("is_to_me", &self.is_to_me)
            .field("is_qq", &self.is_qq)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{message_ctx, test_session};
    use nano_core::User;

    #[tokio::test]
    async fn test_channel_shape() {
        let at = message_ctx(EventType::AtMessageCreate, "hi");
        assert!(at.only_public() && at.only_channel() && at.only_guild());
        assert!(!at.only_direct() && !at.only_qq());

        let direct = message_ctx(EventType::DirectMessageCreate, "hi");
        assert!(direct.only_direct() && direct.only_private() && direct.is_to_me);
        assert!(!direct.only_channel());

        let group = message_ctx(EventType::GroupAtMessageCreate, "hi");
        assert!(group.only_qq() && group.only_qq_group() && !group.only_guild());
        assert!(!group.only_channel());

        let c2c = message_ctx(EventType::C2cMessageCreate, "hi");
        assert!(c2c.only_qq_private() && c2c.only_private());
    }

    #[tokio::test]
    async fn test_ids() {
        let ctx = message_ctx(EventType::AtMessageCreate, "hi");
        assert_eq!(ctx.group_id(), 100);
        assert_eq!(ctx.user_id(), 7);

        let group = message_ctx(EventType::GroupAtMessageCreate, "hi");
        assert_eq!(group.group_id(), digest_id("100"));
        assert_eq!(group.user_id(), digest_id("7"));

        let c2c = message_ctx(EventType::C2cMessageCreate, "hi");
        assert_eq!(c2c.group_id(), digest_id("7"));
    }

    #[tokio::test]
    async fn test_ids_without_message() {
        let ctx = Ctx::new(
            test_session(),
            Event::new(EventType::Resumed, None, EventData::Resumed),
        );
        assert_eq!(ctx.group_id(), 0);
        assert_eq!(ctx.user_id(), 0);
        assert_eq!(ctx.plain_text(), "");
    }

    #[tokio::test]
    async fn test_flags_need_a_matcher() {
        let mut ctx = message_ctx(EventType::AtMessageCreate, "hi");
        ctx.block();
        ctx.break_chain();
        assert!(!ctx.is_blocked());
        assert!(!ctx.breaks());
        assert!(ctx.message().is_some_and(|m| m.author == Some(User::new("7", "alice"))));
    }
}
