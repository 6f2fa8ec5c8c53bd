//! Event context handed through the matcher chain

mod ctx;
mod reply;
mod state;

pub use ctx::{Ctx, Event};
pub use state::State;
