//! Event dispatcher
//!
//! Turns dispatch envelopes into events. With a callback table installed the
//! table is the only route; otherwise the payload is decoded into its
//! [`EventData`] variant and run through a snapshot of the matchers for its
//! kind on a task of its own, so the listen loop never waits on handlers.

use std::sync::Arc;

use nano_core::Member;
use serde_json::Value;

use crate::api::ApiResult;
use crate::connection::Session;
use crate::context::{Ctx, Event};
use crate::events::{EventData, EventKind, EventType};
use crate::matcher::{evaluate, Matcher};
use crate::protocol::{Envelope, ReadyPayload};

/// Routes dispatch envelopes of a session
pub struct Dispatcher;

impl Dispatcher {
    pub fn route(session: &Arc<Session>, envelope: Envelope) {
        let Some(tag) = envelope.t.as_deref() else {
            tracing::debug!(seq = ?envelope.s, "Dispatch without event type, dropped");
            return;
        };
        let Some(ty) = EventType::from_wire(tag) else {
            tracing::debug!(event_type = tag, "Unknown event type, dropped");
            return;
        };
        let seq = envelope.s;
        let payload = envelope.d.unwrap_or(Value::Null);

        match ty {
            EventType::Ready => match serde_json::from_value::<ReadyPayload>(payload.clone()) {
                Ok(ready) => {
                    tracing::info!(session_id = %ready.session_id, shard = ?ready.shard, "Ready");
                    session.connection().set_ready(ready);
                }
                Err(e) => tracing::warn!(error = %e, "Undecodable READY payload"),
            },
            EventType::Resumed => {
                tracing::info!(session_id = ?session.session_id(), seq = ?seq, "Session resumed");
            }
            _ => {}
        }

        if let Some(callbacks) = session.bot().callbacks() {
            callbacks.invoke(ty, seq, session, payload);
            return;
        }

        let kind = ty.kind();
        let matchers = session.bot().matchers().snapshot(kind);
        if matchers.is_empty() {
            tracing::trace!(event_type = %ty, "No matchers, dropped");
            return;
        }

        let data = match EventData::decode(ty, payload) {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(event_type = %ty, error = %e, "Undecodable event payload, dropped");
                return;
            }
        };
        tracing::debug!(event_type = %ty, kind = %kind, seq = ?seq, matchers = matchers.len(), "Routing event");

        let ctx = Ctx::new(Arc::clone(session), Event::new(ty, seq, data));
        tokio::spawn(Self::run(ctx, matchers));
    }

    async fn run(mut ctx: Ctx, matchers: Vec<Arc<Matcher>>) {
        match ctx.kind() {
            EventKind::MessageDelete => {
                if let Err(e) = resolve_operator(&mut ctx).await {
                    tracing::warn!(error = %e, "Failed to fetch the deleting member, dropped");
                    return;
                }
            }
            EventKind::Message => resolve_to_me(&mut ctx),
            EventKind::Event(_) => {}
        }
        evaluate(ctx, matchers).await;
    }
}

/// Make the deleting member the author of a message-delete event
///
/// The original author moves to `member`.
async fn resolve_operator(ctx: &mut Ctx) -> ApiResult<()> {
    let EventData::MessageDelete(deleted) = &ctx.event.data else {
        return Ok(());
    };
    let guild_id = deleted.message.guild_id.clone();
    let op_id = deleted.op_user.id.clone();
    let api = Arc::clone(ctx.api());

    let operator = api.fetch_member(&guild_id, &op_id).await?;

    if let EventData::MessageDelete(deleted) = &mut ctx.event.data {
        let author = deleted.message.author.take();
        deleted.message.member = Some(Member {
            guild_id,
            user: author,
            ..Member::default()
        });
        deleted.message.author = operator.user;
    }
    Ok(())
}

/// Decide whether a message is addressed to the bot
///
/// In order: mention-everyone, a leading bot name, a leading mention of the
/// bot, and finally whether the channel is private. A leading name or
/// mention is cut from the content together with the spaces after it.
fn resolve_to_me(ctx: &mut Ctx) {
    if ctx.is_to_me {
        return;
    }
    let bot_name = ctx.session().bot_user().map(|u| u.username).unwrap_or_default();
    let at_me = ctx.at_me();
    let private = ctx.only_private();

    let Some(message) = ctx.text_message_mut() else {
        return;
    };
    if message.content.is_empty() {
        return;
    }
    let to_me = message.mention_everyone
        || strip_leading(&mut message.content, &bot_name)
        || strip_leading(&mut message.content, &at_me)
        || private;

    tracing::debug!(to_me, "Resolved message addressee");
    ctx.is_to_me = to_me;
}

fn strip_leading(content: &mut String, token: &str) -> bool {
    if token.is_empty() || !content.starts_with(token) {
        return false;
    }
    let rest = content[token.len()..].trim_start_matches(' ').to_string();
    *content = rest;
    true
}
