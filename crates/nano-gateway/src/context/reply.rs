//! Replies and follow-up waits

use std::time::Duration;

use nano_core::MessageReference;

use super::Ctx;
use crate::api::{ApiError, ApiResult, MessagePost, ReplyTarget, SentMessage, NO_SOURCE_MESSAGE};
use crate::events::EventKind;
use crate::matcher::{FutureEvent, Rule};

impl Ctx {
    /// Where a reply to this event goes
    pub fn reply_target(&self) -> Option<ReplyTarget> {
        let message = self.message()?;
        let target = if self.only_direct() {
            ReplyTarget::Direct {
                guild_id: message.guild_id.clone(),
            }
        } else if self.only_channel() {
            ReplyTarget::Channel {
                channel_id: message.channel_id.clone(),
            }
        } else if self.only_qq_group() {
            ReplyTarget::Group {
                group_openid: message.channel_id.clone(),
            }
        } else if self.only_qq_private() {
            ReplyTarget::User {
                openid: message.channel_id.clone(),
            }
        } else {
            return None;
        };
        Some(target)
    }

    /// Send a passive reply to the triggering message
    ///
    /// Guild replies quote the sender when `reply_to_sender` is set. QQ
    /// replies carry `msg_seq`, the ordinal of this reply to the same source.
    /// Only replies the platform accepted are logged to the reply chain.
    ///
    /// # Errors
    /// Returns the outbound API error, or [`ApiError::NoReplyTarget`] for
    /// events without a message.
    pub async fn post(&self, reply_to_sender: bool, mut post: MessagePost) -> ApiResult<SentMessage> {
        let target = self.reply_target().ok_or(ApiError::NoReplyTarget)?;
        let source_id = self
            .message()
            .map(|m| m.id.clone())
            .filter(|id| !id.is_empty());
        let replies = self.bot().replies();

        post.msg_id = Some(source_id.clone().unwrap_or_else(|| NO_SOURCE_MESSAGE.to_string()));
        if reply_to_sender && self.only_guild() {
            if let Some(id) = &source_id {
                post.message_reference = Some(MessageReference::new(id.clone()));
            }
        }
        if target.is_v2() {
            post.infer_v2_type();
            post.msg_seq = Some(source_id.as_deref().map_or(1, |id| replies.next_seq(id)));
        }

        let sent = self.api().send_reply(&target, &post).await?;
        tracing::debug!(target = ?target, reply_id = %sent.id, "Reply sent");

        if let Some(id) = &source_id {
            if !sent.id.is_empty() {
                replies.log_reply(id, &sent.id);
            }
        }
        Ok(sent)
    }

    /// Reply with plain text
    ///
    /// # Errors
    /// See [`Ctx::post`].
    pub async fn send_text(&self, text: impl Into<String>) -> ApiResult<SentMessage> {
        self.post(false, MessagePost::text(text)).await
    }

    /// Ids of the replies already sent for the triggering message
    pub fn replies(&self) -> Vec<String> {
        self.message()
            .map(|m| self.bot().replies().replies(&m.id))
            .unwrap_or_default()
    }

    /// Rule matching follow-ups from the same author in the same channel
    pub fn check_session(&self) -> Rule {
        let (author, channel) = self
            .message()
            .map(|m| (m.author_id().to_string(), m.channel_id.clone()))
            .unwrap_or_default();
        Rule::new(move |ctx| {
            ctx.message()
                .is_some_and(|m| m.author_id() == author && m.channel_id == channel)
        })
    }

    /// Register a temporary matcher for the next qualifying event
    ///
    /// The matcher blocks and runs one step ahead of the current matcher's
    /// priority, so a blocking sibling at that priority cannot swallow the
    /// follow-up. It is not wrapped by the engine's handlers, so a guard held
    /// by the waiting handler cannot reject it either.
    pub fn future_event(&self, kind: EventKind, rules: impl IntoIterator<Item = Rule>) -> FutureEvent {
        let priority = self.matcher().map_or(0, |m| m.priority().saturating_sub(1));
        FutureEvent::new(self.bot().matchers(), kind, rules)
            .priority(priority)
            .block(true)
    }

    /// Ask for a follow-up message in the same session
    ///
    /// Sends `prompt` when it is non-empty and returns the content of the
    /// next message from the same author in the same channel, or `None`
    /// after `timeout`.
    pub async fn get(&self, prompt: &str, timeout: Duration) -> Option<String> {
        let pending = self
            .future_event(EventKind::Message, [self.check_session()])
            .next();
        if !prompt.is_empty() {
            if let Err(e) = self.send_text(prompt).await {
                tracing::warn!(error = %e, "Failed to send prompt");
            }
        }
        let next = pending.recv_timeout(timeout).await?;
        Some(next.message_string())
    }
}
