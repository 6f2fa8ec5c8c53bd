//! Resume handshake (op 6)

use crate::connection::{ConnectionState, Session, WsReader};
use crate::protocol::{Envelope, ResumePayload};

use super::{dial, SessionError, SessionResult};

/// Re-attaches to an existing session over a new socket
pub struct ResumeHandler;

impl ResumeHandler {
    /// Dial and send Resume with the stored token and last-seen sequence
    ///
    /// Does not wait for a reply: the server replays missed dispatches on the
    /// returned reader, followed by RESUMED.
    pub async fn resume(session: &Session) -> SessionResult<WsReader> {
        let conn = session.connection();
        let session_id = conn.session_id().ok_or(SessionError::NoSession)?;
        let url = session.bot().gateway_url().await?;

        conn.set_state(ConnectionState::Resuming);
        let (writer, reader) = dial(&url).await?;
        conn.install_writer(writer).await;

        let payload = ResumePayload {
            token: session.bot().config().authorization(),
            session_id,
            seq: conn.last_seq().unwrap_or_default(),
        };
        conn.send(&Envelope::resume(&payload)?).await?;

        tracing::info!(session_id = %payload.session_id, seq = payload.seq, "Resume sent");
        Ok(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_session;

    #[tokio::test]
    async fn test_resume_without_ready_fails() {
        let session = test_session();
        let err = ResumeHandler::resume(&session).await.unwrap_err();
        assert!(matches!(err, SessionError::NoSession));
    }
}
