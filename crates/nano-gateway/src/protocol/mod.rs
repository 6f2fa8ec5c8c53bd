//! Gateway protocol definitions
//!
//! Op codes, the envelope format, payloads and close codes.

mod close_codes;
mod error;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::CloseCode;
pub use error::{ProtocolError, ProtocolResult};
pub use messages::{Envelope, READY_EVENT, RESUMED_EVENT};
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, ReadyPayload, ResumePayload};
