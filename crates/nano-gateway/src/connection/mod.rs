//! Connection management
//!
//! Socket state, the per-shard session state machine and the registry of
//! connected sessions.

mod connection;
mod manager;
mod session;

pub use connection::{Connection, ConnectionState, WsReader, WsStream, WsWriter};
pub use manager::SessionManager;
pub use session::Session;
