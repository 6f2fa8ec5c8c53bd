//! Session state machine
//!
//! One `Session` per shard. `run` owns the listen loop; a sibling task owns
//! the heartbeat. Transport failures never leave this module: connect is
//! retried on the connect backoff, resume on the resume backoff.

use std::sync::Arc;

use futures_util::StreamExt;
use nano_core::User;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use super::{Connection, ConnectionState, WsReader};
use crate::bot::Bot;
use crate::handlers::{Flow, HeartbeatHandler, IdentifyHandler, OpcodeHandler, ResumeHandler, SessionError};
use crate::protocol::{CloseCode, Envelope, ReadyPayload};

/// A gateway session of one shard
pub struct Session {
    bot: Arc<Bot>,
    conn: Connection,
}

impl Session {
    pub fn new(bot: Arc<Bot>, shard: [u32; 2]) -> Arc<Self> {
        Arc::new(Self {
            bot,
            conn: Connection::new(shard),
        })
    }

    /// Create a session and drive it on a new task
    pub fn spawn(bot: Arc<Bot>, shard: [u32; 2]) -> Arc<Self> {
        let session = Self::new(bot, shard);
        tokio::spawn(Arc::clone(&session).run());
        session
    }

    pub fn bot(&self) -> &Arc<Bot> {
        &self.bot
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn shard(&self) -> [u32; 2] {
        self.conn.shard()
    }

    pub fn ready(&self) -> Option<ReadyPayload> {
        self.conn.ready()
    }

    pub fn session_id(&self) -> Option<String> {
        self.conn.session_id()
    }

    /// The bot's own account, known once READY arrived
    pub fn bot_user(&self) -> Option<User> {
        self.conn.bot_user()
    }

    /// Mention token of the bot itself: `<@!{id}>`
    pub fn at_me(&self) -> String {
        let id = self.bot_user().map(|u| u.id).unwrap_or_default();
        format!("<@!{id}>")
    }

    /// Connect, then listen for the life of the process
    pub async fn run(self: Arc<Self>) {
        tokio::spawn(HeartbeatHandler::run(Arc::clone(&self)));
        let reader = self.connect().await;
        self.listen(reader).await;
    }

    /// Identify from scratch, retrying until a READY arrives
    async fn connect(self: &Arc<Self>) -> WsReader {
        self.unregister();
        self.conn.reset_heartbeat_interval();
        self.conn.clear_session();

        loop {
            self.conn.set_state(ConnectionState::Connecting);
            match IdentifyHandler::handshake(self).await {
                Ok(reader) => {
                    self.conn.set_state(ConnectionState::Connected);
                    self.register();
                    return reader;
                }
                Err(e) => {
                    tracing::error!(shard = ?self.shard(), error = %e, "Connect failed, retrying");
                    self.abandon_attempt().await;
                    sleep(self.bot.gateway_config().connect_retry()).await;
                }
            }
        }
    }

    /// Re-attach to the current session, retrying until the socket is up
    ///
    /// Falls back to a full connect when there is no session to resume.
    async fn resume(self: &Arc<Self>) -> WsReader {
        self.unregister();
        self.conn.reset_heartbeat_interval();

        loop {
            match ResumeHandler::resume(self).await {
                Ok(reader) => {
                    self.conn.set_state(ConnectionState::Connected);
                    self.register();
                    return reader;
                }
                Err(SessionError::NoSession) => return self.connect().await,
                Err(e) => {
                    tracing::warn!(shard = ?self.shard(), error = %e, "Resume failed, retrying");
                    self.abandon_attempt().await;
                    sleep(self.bot.gateway_config().resume_retry()).await;
                }
            }
        }
    }

    /// The listen loop: sole reader of the socket
    async fn listen(self: &Arc<Self>, mut reader: WsReader) {
        loop {
            let envelope = match reader.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    tracing::trace!(frame = %text, "Received frame");
                    match Envelope::from_json(&text) {
                        Ok(envelope) => envelope,
                        Err(e) => {
                            tracing::warn!(error = %e, "Undecodable frame, resuming");
                            reader = self.resume().await;
                            continue;
                        }
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    let code = frame.map(|f| u16::from(f.code));
                    reader = match code {
                        Some(code) if !CloseCode::resumable(code) => {
                            tracing::warn!(code, "Socket closed, session not resumable");
                            self.connect().await
                        }
                        _ => {
                            tracing::warn!(code = ?code, "Socket closed, resuming");
                            self.resume().await
                        }
                    };
                    continue;
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Read failed, resuming");
                    reader = self.resume().await;
                    continue;
                }
                None => {
                    tracing::warn!("Socket ended, resuming");
                    reader = self.resume().await;
                    continue;
                }
            };

            if OpcodeHandler::handle(self, envelope) == Flow::Reidentify {
                reader = self.connect().await;
            }
        }
    }

    async fn abandon_attempt(&self) {
        self.conn.close().await;
        self.conn.set_state(ConnectionState::Disconnected);
    }

    fn register(self: &Arc<Self>) {
        if let Some(id) = self.session_id() {
            self.bot.sessions().add(id, Arc::clone(self));
        }
    }

    fn unregister(&self) {
        if let Some(id) = self.session_id() {
            self.bot.sessions().remove(&id);
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("conn", &self.conn).finish()
    }
}
