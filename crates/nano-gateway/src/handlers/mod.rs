//! Op code handlers
//!
//! The handshake steps of a session (identify, resume), its heartbeat task
//! and the routing of envelopes read by the listen loop.

mod error;
mod heartbeat;
mod identify;
mod resume;

pub use error::{SessionError, SessionResult};
pub use heartbeat::HeartbeatHandler;
pub use identify::IdentifyHandler;
pub use resume::ResumeHandler;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use crate::connection::{Session, WsReader, WsWriter};
use crate::dispatch::Dispatcher;
use crate::protocol::{Envelope, OpCode};

/// How long a single handshake step may wait on the server
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// What the listen loop does after an envelope was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading the current socket
    Continue,
    /// Drop the session and identify from scratch
    Reidentify,
}

/// Routes envelopes read by the listen loop
pub struct OpcodeHandler;

impl OpcodeHandler {
    /// Handle one envelope read from the socket
    pub fn handle(session: &Arc<Session>, envelope: Envelope) -> Flow {
        let conn = session.connection();

        match envelope.op {
            OpCode::Dispatch => {
                if let Some(seq) = envelope.s {
                    if !conn.accept_seq(seq) {
                        tracing::debug!(
                            seq,
                            last_seq = ?conn.last_seq(),
                            event_type = ?envelope.t,
                            "Dropping already seen dispatch"
                        );
                        return Flow::Continue;
                    }
                }
                Dispatcher::route(session, envelope);
                Flow::Continue
            }
            OpCode::Heartbeat => {
                tracing::debug!(shard = ?conn.shard(), "Server requested heartbeat");
                Flow::Continue
            }
            OpCode::Reconnect => {
                tracing::info!(shard = ?conn.shard(), "Server asked to reconnect");
                conn.reset_heartbeat_interval();
                Flow::Reidentify
            }
            OpCode::InvalidSession => {
                tracing::warn!(shard = ?conn.shard(), "Session invalidated by server");
                conn.reset_heartbeat_interval();
                Flow::Reidentify
            }
            OpCode::Hello => {
                match envelope.heartbeat_interval() {
                    Ok(interval) => {
                        tracing::debug!(interval, "Heartbeat interval updated");
                        conn.set_heartbeat_interval(interval);
                    }
                    Err(e) => tracing::warn!(error = %e, "Ignoring malformed Hello"),
                }
                Flow::Continue
            }
            OpCode::HeartbeatAck => {
                tracing::trace!(shard = ?conn.shard(), "Heartbeat acknowledged");
                Flow::Continue
            }
            OpCode::HttpCallbackAck => {
                tracing::trace!(shard = ?conn.shard(), "HTTP callback acknowledged");
                Flow::Continue
            }
            OpCode::Identify | OpCode::Resume => {
                tracing::warn!(op = %envelope.op, "Received client-only op code from server");
                Flow::Continue
            }
        }
    }
}

/// Open a socket and split it
pub(crate) async fn dial(url: &str) -> SessionResult<(WsWriter, WsReader)> {
    let (stream, _) = tokio::time::timeout(HANDSHAKE_TIMEOUT, connect_async(url))
        .await
        .map_err(|_| SessionError::Timeout("dial"))??;
    Ok(stream.split())
}

/// Read the next envelope during a handshake
pub(crate) async fn next_envelope(
    reader: &mut WsReader,
    expecting: &'static str,
) -> SessionResult<Envelope> {
    loop {
        let frame = tokio::time::timeout(HANDSHAKE_TIMEOUT, reader.next())
            .await
            .map_err(|_| SessionError::Timeout(expecting))?;

        match frame {
            Some(Ok(WsMessage::Text(text))) => {
                tracing::trace!(frame = %text, "Handshake frame");
                return Ok(Envelope::from_json(&text)?);
            }
            Some(Ok(WsMessage::Close(frame))) => {
                return Err(SessionError::Closed(frame.map(|f| u16::from(f.code))));
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => return Err(err.into()),
            None => return Err(SessionError::Closed(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_session;

    #[tokio::test]
    async fn test_duplicate_dispatch_dropped() {
        let session = test_session();
        let conn = session.connection();
        conn.set_last_seq(5);

        let stale = Envelope::dispatch("GUILD_CREATE", 5, serde_json::json!({}));
        assert_eq!(OpcodeHandler::handle(&session, stale), Flow::Continue);
        assert_eq!(conn.last_seq(), Some(5));

        let fresh = Envelope::dispatch("GUILD_CREATE", 6, serde_json::json!({}));
        assert_eq!(OpcodeHandler::handle(&session, fresh), Flow::Continue);
        assert_eq!(conn.last_seq(), Some(6));
    }

    #[tokio::test]
    async fn test_last_seq_tracks_maximum() {
        let session = test_session();
        for seq in [1, 2, 4, 3, 4, 9, 7] {
            let env = Envelope::dispatch("GUILD_UPDATE", seq, serde_json::json!({}));
            OpcodeHandler::handle(&session, env);
        }
        assert_eq!(session.connection().last_seq(), Some(9));
    }

    #[tokio::test]
    async fn test_reconnect_and_invalid_session_reidentify() {
        let session = test_session();
        session.connection().set_heartbeat_interval(1_000);

        let flow = OpcodeHandler::handle(&session, Envelope::bare(OpCode::Reconnect));
        assert_eq!(flow, Flow::Reidentify);
        assert!(session.connection().heartbeat_interval().is_none());

        let flow = OpcodeHandler::handle(&session, Envelope::bare(OpCode::InvalidSession));
        assert_eq!(flow, Flow::Reidentify);
    }

    #[tokio::test]
    async fn test_hello_updates_interval() {
        let session = test_session();
        let hello = Envelope::hello(crate::protocol::HelloPayload::with_interval(41_250));
        assert_eq!(OpcodeHandler::handle(&session, hello), Flow::Continue);
        assert_eq!(
            session.connection().heartbeat_interval(),
            Some(Duration::from_millis(41_250))
        );
    }
}
