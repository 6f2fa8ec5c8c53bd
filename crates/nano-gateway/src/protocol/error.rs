//! Protocol errors

use thiserror::Error;

use super::OpCode;

/// Errors raised while encoding or decoding envelopes
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("expected {expected}, got {actual}")]
    UnexpectedOpCode { expected: OpCode, actual: OpCode },

    #[error("expected dispatch {expected}, got {actual:?}")]
    UnexpectedEvent { expected: &'static str, actual: Option<String> },

    #[error("{0} envelope carries no payload")]
    MissingPayload(OpCode),

    #[error("invalid {op} payload: {source}")]
    InvalidPayload {
        op: OpCode,
        #[source]
        source: serde_json::Error,
    },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
