//! Value objects - small immutable types shared across the workspace

mod intents;

pub use intents::{Intents, IntentsParseError};
