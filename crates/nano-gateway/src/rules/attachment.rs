//! Attachment rules

use std::time::Duration;

use nano_core::MessageAttachment;

use crate::context::Ctx;
use crate::events::EventKind;
use crate::matcher::Rule;

/// State key holding the `Vec<MessageAttachment>` of the message
pub const ATTACHMENTS: &str = "attachments";

/// How long [`must_provide_attachment`] waits for the follow-up
pub const ATTACHMENT_TIMEOUT: Duration = Duration::from_secs(120);

/// Priority of the follow-up matcher, below every regular service
const FOLLOW_UP_PRIORITY: i32 = 999;

/// Message carries attachments; sets `attachments`
pub fn has_attachments() -> Rule {
    Rule::new(|ctx| {
        let Some(attachments) = ctx
            .text_message()
            .filter(|m| m.has_attachments())
            .map(|m| m.attachments.clone())
        else {
            return false;
        };
        ctx.state.insert(ATTACHMENTS, attachments);
        true
    })
}

/// Require attachments, asking the sender for them when missing
///
/// Passes at once when the message has attachments. Otherwise replies with
/// `need_hint` and waits up to `timeout` for a message with attachments from
/// the same sender in the same channel; that message then replaces the
/// event. On timeout replies with `fail_hint` and fails.
pub fn must_provide_attachment(need_hint: &str, fail_hint: &str, timeout: Duration) -> Rule {
    let need_hint = need_hint.to_string();
    let fail_hint = fail_hint.to_string();
    let present = has_attachments();
    Rule::new_async(move |ctx| {
        let need_hint = need_hint.clone();
        let fail_hint = fail_hint.clone();
        let present = present.clone();
        Box::pin(async move {
            if present.check(ctx).await {
                return true;
            }
            let pending = ctx
                .future_event(EventKind::Message, [ctx.check_session(), has_attachments()])
                .priority(FOLLOW_UP_PRIORITY)
                .block(false)
                .next();
            send_hint(ctx, &need_hint).await;

            let Some(next) = pending.recv_timeout(timeout).await else {
                send_hint(ctx, &fail_hint).await;
                return false;
            };
            if let Some(attachments) = next.state.get::<Vec<MessageAttachment>>(ATTACHMENTS) {
                ctx.state.insert(ATTACHMENTS, attachments.clone());
            }
            ctx.event = next.event;
            true
        })
    })
}

async fn send_hint(ctx: &Ctx, hint: &str) {
    if hint.is_empty() {
        return;
    }
    if let Err(e) = ctx.send_text(hint).await {
        tracing::warn!(error = %e, "Failed to send attachment hint");
    }
}
