//! Socket state of one session
//!
//! The write half of the socket lives behind one async mutex so heartbeats,
//! identify/resume and any other writer never interleave frames. The read
//! half is owned by the listen loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::SinkExt;
use nano_core::User;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::handlers::{SessionError, SessionResult};
use crate::protocol::{Envelope, ReadyPayload};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub type WsReader = SplitStream<WsStream>;
pub type WsWriter = SplitSink<WsStream, WsMessage>;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    AwaitingHello,
    Identifying,
    AwaitingReady,
    Connected,
    Resuming,
}

/// Socket state of one shard
pub struct Connection {
    shard: [u32; 2],
    state: RwLock<ConnectionState>,
    writer: Mutex<Option<WsWriter>>,
    /// Last accepted dispatch sequence, 0 before any
    last_seq: AtomicU64,
    /// Heartbeat interval in milliseconds, 0 while unknown
    heartbeat_interval: AtomicU64,
    ready: RwLock<Option<ReadyPayload>>,
}

impl Connection {
    pub fn new(shard: [u32; 2]) -> Self {
        Self {
            shard,
            state: RwLock::new(ConnectionState::Disconnected),
            writer: Mutex::new(None),
            last_seq: AtomicU64::new(0),
            heartbeat_interval: AtomicU64::new(0),
            ready: RwLock::new(None),
        }
    }

    /// `[shard_index, shard_count]`
    pub fn shard(&self) -> [u32; 2] {
        self.shard
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    // === Writer ===

    /// Install the write half of a new socket, closing the previous one
    pub async fn install_writer(&self, writer: WsWriter) {
        let old = self.writer.lock().await.replace(writer);
        if let Some(mut old) = old {
            let _ = old.close().await;
        }
    }

    /// Close the current socket, if any
    pub async fn close(&self) {
        let old = self.writer.lock().await.take();
        if let Some(mut old) = old {
            let _ = old.close().await;
        }
    }

    /// Serialize and write one envelope under the write lock
    pub async fn send(&self, envelope: &Envelope) -> SessionResult<()> {
        let json = envelope.to_json()?;
        let mut writer = self.writer.lock().await;
        let sink = writer.as_mut().ok_or(SessionError::NotConnected)?;
        tracing::trace!(shard = ?self.shard, op = %envelope.op, "sending frame");
        sink.send(WsMessage::Text(json)).await?;
        Ok(())
    }

    // === Sequence ===

    /// Last accepted dispatch sequence
    pub fn last_seq(&self) -> Option<u64> {
        match self.last_seq.load(Ordering::Acquire) {
            0 => None,
            seq => Some(seq),
        }
    }

    /// Advance last-seen to `seq` if it is newer; false for duplicates
    pub fn accept_seq(&self, seq: u64) -> bool {
        self.last_seq
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| (seq > last).then_some(seq))
            .is_ok()
    }

    /// Set the sequence baseline announced by READY
    pub fn set_last_seq(&self, seq: u64) {
        self.last_seq.store(seq, Ordering::Release);
    }

    // === Heartbeat interval ===

    /// Heartbeat interval, `None` while unknown
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        match self.heartbeat_interval.load(Ordering::Acquire) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    pub fn set_heartbeat_interval(&self, millis: u64) {
        self.heartbeat_interval.store(millis, Ordering::Release);
    }

    /// Mark the interval unknown until the next Hello
    pub fn reset_heartbeat_interval(&self) {
        self.heartbeat_interval.store(0, Ordering::Release);
    }

    // === Ready info ===

    pub fn ready(&self) -> Option<ReadyPayload> {
        self.ready.read().clone()
    }

    /// Resume token of the current session
    pub fn session_id(&self) -> Option<String> {
        self.ready.read().as_ref().map(|r| r.session_id.clone())
    }

    /// The bot's own account as reported by READY
    pub fn bot_user(&self) -> Option<User> {
        self.ready.read().as_ref().map(|r| r.user.clone())
    }

    pub fn set_ready(&self, ready: ReadyPayload) {
        *self.ready.write() = Some(ready);
    }

    /// Forget the session before a full re-identify
    pub fn clear_session(&self) {
        *self.ready.write() = None;
        self.last_seq.store(0, Ordering::Release);
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("shard", &self.shard)
            .field("state", &self.state())
            .field("last_seq", &self.last_seq())
            .field("heartbeat_interval", &self.heartbeat_interval())
            .finish()
    }
}
