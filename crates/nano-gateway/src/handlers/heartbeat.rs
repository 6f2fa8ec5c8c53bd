//! Heartbeat task (op 1)

use std::sync::Arc;

use tokio::time::sleep;

use crate::connection::{Connection, Session};
use crate::protocol::Envelope;

/// Keeps a session's socket alive
pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// Heartbeat loop of one session, runs for the life of the process
    ///
    /// Polls while the interval is unknown; once known, sleeps one interval
    /// and beats unless the interval was reset meanwhile.
    pub async fn run(session: Arc<Session>) {
        let conn = session.connection();
        let poll = session.bot().gateway_config().heartbeat_poll();

        loop {
            let Some(interval) = conn.heartbeat_interval() else {
                sleep(poll).await;
                continue;
            };
            sleep(interval).await;
            if conn.heartbeat_interval().is_none() {
                continue;
            }
            Self::beat(conn).await;
        }
    }

    /// Write one heartbeat carrying the last-seen sequence
    pub async fn beat(conn: &Connection) {
        let seq = conn.last_seq();
        match conn.send(&Envelope::heartbeat(seq)).await {
            Ok(()) => tracing::trace!(seq = ?seq, "Heartbeat sent"),
            Err(e) => tracing::warn!(error = %e, "Heartbeat failed"),
        }
    }
}
