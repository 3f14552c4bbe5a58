//! # rt-llm
//!
//! LLM collaborator for ResearchTools.
//!
//! Everything goes through the [`ChatClient`] trait so the server can be
//! driven by a fake in tests. [`OpenAiClient`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint and always asks for a JSON object reply.
//!
//! - [`prompts`]: request builders for content intelligence and ACH suggestions.
//! - [`reply`]: fence-tolerant JSON parsing and the typed reply shapes.

mod error;
mod http;
pub mod openai;
pub mod prompts;
pub mod reply;

pub use error::LlmError;
pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single system + user prompt pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    /// Overrides the client's configured temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Chat completion returning a parsed JSON value.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the request and parse the reply as JSON.
    async fn complete_json(&self, request: ChatRequest) -> Result<serde_json::Value, LlmError>;

    /// Model identifier, for logging and health output.
    fn model(&self) -> &str;
}
