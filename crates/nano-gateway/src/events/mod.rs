//! Gateway events
//!
//! Dispatch event types and their decoded payloads.

mod event_types;
mod payloads;

pub use event_types::{EventKind, EventType};
pub use payloads::{EventData, OpenForumEvent};
