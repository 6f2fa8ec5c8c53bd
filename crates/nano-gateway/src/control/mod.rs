//! Service control
//!
//! In-memory per-service enable state, bans and help text, the registry
//! that hands each service its engine, and the admin commands that drive
//! them from chat.

mod admin;
mod error;
mod manager;
mod service;

pub use admin::ADMIN_PRIORITY;
pub use error::{ControlError, ControlResult};
pub use manager::{Manager, DEFAULT_DATA_FOLDER, MANAGER_KEY};
pub use service::{Control, Options, ALL_GROUPS};
