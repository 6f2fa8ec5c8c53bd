//! Outbound API seam

use async_trait::async_trait;
use nano_core::Member;

use super::{ApiResult, MessagePost, ReplyTarget, SentMessage, ShardGateway};

/// Platform REST calls the gateway client depends on
///
/// The session and the reply helpers only see this trait, so tests can run
/// against a stub instead of the real platform.
#[async_trait]
pub trait OpenApi: Send + Sync {
    /// WebSocket url for unsharded sessions
    async fn fetch_gateway_url(&self) -> ApiResult<String>;

    /// WebSocket url together with the recommended shard count
    async fn fetch_shard_gateway(&self) -> ApiResult<ShardGateway>;

    /// Post a message to a target
    async fn send_reply(&self, target: &ReplyTarget, post: &MessagePost) -> ApiResult<SentMessage>;

    /// Fetch a guild member
    async fn fetch_member(&self, guild_id: &str, user_id: &str) -> ApiResult<Member>;
}
