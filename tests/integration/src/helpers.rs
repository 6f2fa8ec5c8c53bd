//! Test helpers for integration tests
//!
//! Provides a fake gateway the session under test dials, a recording
//! OpenApi, and a bot wired to both.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use nano_common::{BotConfig, GatewayConfig};
use nano_core::Member;
use nano_gateway::api::{ApiError, ApiResult, MessagePost, OpenApi, ReplyTarget, SentMessage, ShardGateway};
use nano_gateway::protocol::{Envelope, OpCode};
use nano_gateway::Bot;
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::WebSocketStream;

use crate::fixtures::{APP_ID, TOKEN};

/// How long a helper waits before failing the test
pub const WAIT: Duration = Duration::from_secs(5);

/// Gateway timing short enough for tests
pub fn fast_gateway() -> GatewayConfig {
    GatewayConfig {
        connect_retry_ms: 50,
        resume_retry_ms: 50,
        heartbeat_poll_ms: 10,
    }
}

/// A listening socket standing in for the platform gateway
pub struct FakeGateway {
    listener: TcpListener,
    addr: SocketAddr,
}

impl FakeGateway {
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    /// Url the bot dials
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Accept the next client socket
    pub async fn accept(&self) -> Result<GatewaySocket> {
        let (stream, _) = tokio::time::timeout(WAIT, self.listener.accept())
            .await
            .context("no client connected")??;
        let ws = tokio_tungstenite::accept_async(stream).await?;
        Ok(GatewaySocket { ws })
    }
}

/// Server side of one client connection
pub struct GatewaySocket {
    ws: WebSocketStream<TcpStream>,
}

impl GatewaySocket {
    pub async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let text = serde_json::to_string(envelope)?;
        self.ws.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    /// Next envelope written by the client
    pub async fn recv(&mut self) -> Result<Envelope> {
        loop {
            let frame = tokio::time::timeout(WAIT, self.ws.next())
                .await
                .context("client sent nothing")?
                .ok_or_else(|| anyhow!("client closed the socket"))??;
            match frame {
                WsMessage::Text(text) => return Ok(serde_json::from_str(&text)?),
                WsMessage::Close(_) => bail!("client closed the socket"),
                _ => {}
            }
        }
    }

    /// Next envelope with the given op code, skipping everything else
    pub async fn recv_op(&mut self, op: OpCode) -> Result<Envelope> {
        loop {
            let envelope = self.recv().await?;
            if envelope.op == op {
                return Ok(envelope);
            }
        }
    }

    /// Run the server half of an identify: Hello, wait for Identify, READY
    pub async fn handshake(&mut self, interval_ms: u64, session_id: &str, seq: u64) -> Result<Envelope> {
        self.send(&crate::fixtures::hello(interval_ms)).await?;
        let identify = self.recv_op(OpCode::Identify).await?;
        self.send(&crate::fixtures::ready(session_id, seq)).await?;
        Ok(identify)
    }
}

/// OpenApi that records every reply and never touches the network
#[derive(Default)]
pub struct RecordingApi {
    replies: Mutex<Vec<(ReplyTarget, MessagePost)>>,
}

impl RecordingApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replies(&self) -> Vec<(ReplyTarget, MessagePost)> {
        self.replies.lock().clone()
    }

    /// Wait until at least `count` replies were recorded
    pub async fn wait_for_replies(&self, count: usize) -> Result<Vec<(ReplyTarget, MessagePost)>> {
        wait_until(|| self.replies.lock().len() >= count).await?;
        Ok(self.replies())
    }
}

#[async_trait]
impl OpenApi for RecordingApi {
    async fn fetch_gateway_url(&self) -> ApiResult<String> {
        Err(ApiError::status(500, 0, "gateway url is configured by the test"))
    }

    async fn fetch_shard_gateway(&self) -> ApiResult<ShardGateway> {
        Err(ApiError::status(500, 0, "gateway url is configured by the test"))
    }

    async fn send_reply(&self, target: &ReplyTarget, post: &MessagePost) -> ApiResult<SentMessage> {
        let mut replies = self.replies.lock();
        replies.push((target.clone(), post.clone()));
        Ok(SentMessage {
            id: format!("reply-{}", replies.len()),
        })
    }

    async fn fetch_member(&self, _guild_id: &str, _user_id: &str) -> ApiResult<Member> {
        Err(ApiError::status(404, 0, "unknown member"))
    }
}

/// Single-shard bot dialing `url` with a recording API
pub fn test_bot(url: &str, api: Arc<RecordingApi>) -> Result<Arc<Bot>> {
    let mut config = BotConfig::new(APP_ID, TOKEN);
    config.shard_count = 1;
    Bot::builder(config)
        .gateway(fast_gateway())
        .api(api)
        .gateway_url(url)
        .build()
        .map_err(Into::into)
}

/// Poll `check` until it holds or [`WAIT`] runs out
pub async fn wait_until(mut check: impl FnMut() -> bool) -> Result<()> {
    tokio::time::timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .context("condition not reached in time")
}
