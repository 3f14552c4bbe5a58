//! LLM error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key is configured.
    #[error("LLM is not configured")]
    NotConfigured,

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The completion had no message content.
    #[error("empty completion")]
    EmptyReply,

    /// The reply was not the JSON we asked for.
    #[error("invalid JSON reply: {0}")]
    InvalidJson(String),
}
