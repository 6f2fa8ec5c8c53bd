//! Session error types

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use crate::api::ApiError;
use crate::protocol::ProtocolError;

/// Errors of one connection attempt
///
/// These never escape the session's retry loops; they are logged and the
/// attempt is repeated after the configured backoff.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Dial, read or write failure
    #[error("transport: {0}")]
    Transport(Box<tungstenite::Error>),

    /// Malformed envelope or unexpected op code
    #[error("protocol: {0}")]
    Protocol(#[from] ProtocolError),

    /// Fetching the gateway url failed
    #[error("gateway url: {0}")]
    Api(#[from] ApiError),

    /// Server closed the socket during the handshake
    #[error("connection closed{}", .0.map(|c| format!(" with code {c}")).unwrap_or_default())]
    Closed(Option<u16>),

    /// No frame arrived in time
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// Write attempted while no socket is installed
    #[error("not connected")]
    NotConnected,

    /// Resume attempted before any READY was received
    #[error("no session to resume")]
    NoSession,
}

impl From<tungstenite::Error> for SessionError {
    fn from(err: tungstenite::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
