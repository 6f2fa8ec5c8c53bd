//! Outbound API errors

use thiserror::Error;

/// Longest platform error message kept in an [`ApiError`]
const MAX_MESSAGE_CHARS: usize = 256;

/// Errors returned by the outbound API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("status {status}, code {code}: {message}")]
    Status { status: u16, code: i64, message: String },

    #[error("decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response carries no body")]
    EmptyBody,

    /// The event has no channel a reply could go to
    #[error("event has no reply target")]
    NoReplyTarget,
}

impl ApiError {
    /// Build a status error, truncating overly long platform messages
    pub fn status(status: u16, code: i64, message: &str) -> Self {
        let message = if message.chars().count() > MAX_MESSAGE_CHARS {
            let mut cut: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
            cut.push_str("...");
            cut
        } else {
            message.to_string()
        };
        Self::Status { status, code, message }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
