//! Identify handshake (op 2)

use crate::connection::{ConnectionState, Session, WsReader};
use crate::protocol::{Envelope, IdentifyPayload, IdentifyProperties, OpCode, ProtocolError, READY_EVENT};

use super::{dial, next_envelope, SessionResult};

/// Opens a socket and identifies
pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Run a full handshake: Hello, Identify, then wait for READY
    ///
    /// On success the writer is installed on the session's connection, the
    /// ready info and sequence baseline are recorded, and the read half is
    /// returned to the listen loop.
    pub async fn handshake(session: &Session) -> SessionResult<WsReader> {
        let conn = session.connection();
        let bot = session.bot();

        let url = bot.gateway_url().await?;
        tracing::debug!(url = %url, shard = ?conn.shard(), "Dialing gateway");
        let (writer, mut reader) = dial(&url).await?;

        conn.set_state(ConnectionState::AwaitingHello);
        let hello = next_envelope(&mut reader, "Hello").await?;
        conn.set_heartbeat_interval(hello.heartbeat_interval()?);
        conn.install_writer(writer).await;

        conn.set_state(ConnectionState::Identifying);
        let config = bot.config();
        let payload = IdentifyPayload {
            token: config.authorization(),
            intents: config.intents,
            shard: conn.shard(),
            properties: IdentifyProperties::new(),
        };
        conn.send(&Envelope::identify(&payload)?).await?;

        conn.set_state(ConnectionState::AwaitingReady);
        loop {
            let envelope = next_envelope(&mut reader, "Ready").await?;
            match envelope.op {
                OpCode::Dispatch => {
                    let ready = envelope.as_ready()?;
                    tracing::info!(
                        session_id = %ready.session_id,
                        shard = ?conn.shard(),
                        user = %ready.user.username,
                        "Session ready"
                    );
                    conn.set_ready(ready);
                    if let Some(seq) = envelope.s {
                        conn.set_last_seq(seq);
                    }
                    return Ok(reader);
                }
                OpCode::Heartbeat | OpCode::HeartbeatAck => {}
                OpCode::Hello => {
                    conn.set_heartbeat_interval(envelope.heartbeat_interval()?);
                }
                other => {
                    return Err(ProtocolError::UnexpectedEvent {
                        expected: READY_EVENT,
                        actual: Some(other.name().to_string()),
                    }
                    .into());
                }
            }
        }
    }
}
