//! # nano-gateway
//!
//! Bot client for the QQ guild gateway: the per-shard session state
//! machine, event dispatch, and the matcher engine plugins register into.
//!
//! ```no_run
//! use nano_gateway::{rules, Bot, Engine};
//! # async fn demo(config: nano_common::BotConfig) -> Result<(), nano_gateway::api::ApiError> {
//! let bot = Bot::builder(config).build()?;
//! let engine = Engine::new(bot.matchers().clone());
//! engine
//!     .on_message_full_match("ping", [rules::only_to_me()])
//!     .handle_owned(|ctx| async move {
//!         let _ = ctx.send_text("pong").await;
//!     });
//! bot.start().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod bot;
pub mod connection;
pub mod context;
pub mod control;
pub mod dispatch;
pub mod events;
pub mod handlers;
pub mod matcher;
pub mod protocol;
pub mod rules;

#[cfg(test)]
pub(crate) mod testing;

pub use bot::{Bot, BotBuilder};
pub use connection::{Session, SessionManager};
pub use context::{Ctx, Event, State};
pub use control::{Manager, Options};
pub use dispatch::{CallbackTable, Dispatcher};
pub use events::{EventData, EventKind, EventType};
pub use matcher::{Engine, FutureEvent, MatcherHandle, Rule, SingleFlight};
