//! Matcher engine
//!
//! Matchers are registered per logical event kind through an [`Engine`] and
//! evaluated in ascending priority order by [`evaluate`].

mod engine;
mod evaluate;
mod future;
#[allow(clippy::module_inception)]
mod matcher;
mod registry;
mod rule;
mod single_flight;

pub use engine::{Engine, EngineHooks, MatcherBuilder};
pub use evaluate::{evaluate, StageOutcome};
pub use future::{FutureEvent, Pending, Repeat};
pub use matcher::{Matcher, MatcherHandle, MatcherId};
pub use registry::MatcherRegistry;
pub use rule::{Handler, PostHandler, Rule};
pub use single_flight::{SingleFlight, SINGLE_KEY};
