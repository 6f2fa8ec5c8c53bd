//! Outbound platform API
//!
//! The [`OpenApi`] trait covers the REST calls the gateway client makes;
//! [`HttpOpenApi`] implements it over `reqwest`.

mod client;
mod error;
mod http;
mod models;

pub use client::OpenApi;
pub use error::{ApiError, ApiResult};
pub use http::HttpOpenApi;
pub use models::{
    MessagePost, MessageType, ReplyTarget, SentMessage, SessionStartLimit, ShardGateway, NO_SOURCE_MESSAGE,
};
