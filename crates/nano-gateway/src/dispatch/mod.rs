//! Event routing
//!
//! [`Dispatcher`] routes decoded dispatch envelopes either to a static
//! [`CallbackTable`] or into the matcher engine.

mod callbacks;
mod dispatcher;

pub use callbacks::CallbackTable;
pub use dispatcher::Dispatcher;
