//! Envelope format
//!
//! Every frame on the gateway socket is one JSON envelope.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    HelloPayload, IdentifyPayload, OpCode, ProtocolError, ProtocolResult, ReadyPayload, ResumePayload,
};

/// Wire tag of the dispatch that completes an identify
pub const READY_EVENT: &str = "READY";

/// Wire tag of the dispatch that confirms a resume
pub const RESUMED_EVENT: &str = "RESUMED";

/// Gateway envelope `{op, d, s, t}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Operation code
    pub op: OpCode,

    /// Payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,

    /// Sequence number (dispatch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Event type tag (dispatch only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl Envelope {
    fn new(op: OpCode, d: Option<Value>) -> Self {
        Self { op, d, s: None, t: None }
    }

    // === Client Messages ===

    /// Create an Identify envelope (op=2)
    pub fn identify(payload: &IdentifyPayload) -> ProtocolResult<Self> {
        Ok(Self::new(OpCode::Identify, Some(serde_json::to_value(payload)?)))
    }

    /// Create a Resume envelope (op=6)
    pub fn resume(payload: &ResumePayload) -> ProtocolResult<Self> {
        Ok(Self::new(OpCode::Resume, Some(serde_json::to_value(payload)?)))
    }

    /// Create a Heartbeat envelope (op=1); `d` is the last seen sequence or null
    #[must_use]
    pub fn heartbeat(last_seq: Option<u64>) -> Self {
        Self::new(OpCode::Heartbeat, Some(last_seq.map_or(Value::Null, Value::from)))
    }

    // === Server Messages ===

    /// Create a Dispatch envelope (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, seq: u64, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            d: Some(data),
            s: Some(seq),
            t: Some(event_type.into()),
        }
    }

    /// Create a Hello envelope (op=10)
    #[must_use]
    pub fn hello(payload: HelloPayload) -> Self {
        Self::new(
            OpCode::Hello,
            Some(serde_json::json!({ "heartbeat_interval": payload.heartbeat_interval })),
        )
    }

    /// Create an envelope with only an op code (Reconnect, `HeartbeatAck`, ...)
    #[must_use]
    pub fn bare(op: OpCode) -> Self {
        Self::new(op, None)
    }

    // === Parsing ===

    /// Decode the payload as `T`
    pub fn decode<T: DeserializeOwned>(&self) -> ProtocolResult<T> {
        let d = self.d.clone().ok_or(ProtocolError::MissingPayload(self.op))?;
        serde_json::from_value(d).map_err(|source| ProtocolError::InvalidPayload { op: self.op, source })
    }

    /// Heartbeat interval announced by a Hello envelope
    pub fn heartbeat_interval(&self) -> ProtocolResult<u64> {
        self.expect_op(OpCode::Hello)?;
        Ok(self.decode::<HelloPayload>()?.heartbeat_interval)
    }

    /// Parse a READY dispatch
    pub fn as_ready(&self) -> ProtocolResult<ReadyPayload> {
        self.expect_op(OpCode::Dispatch)?;
        if self.t.as_deref() != Some(READY_EVENT) {
            return Err(ProtocolError::UnexpectedEvent {
                expected: READY_EVENT,
                actual: self.t.clone(),
            });
        }
        self.decode()
    }

    fn expect_op(&self, expected: OpCode) -> ProtocolResult<()> {
        if self.op == expected {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedOpCode { expected, actual: self.op })
        }
    }

    // === Utilities ===

    /// Serialize to JSON string
    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "Envelope(op={}, t={}", self.op, t)?;
            if let Some(s) = self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "Envelope(op={})", self.op)
        }
    }
}
