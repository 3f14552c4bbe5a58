//! Client for OpenAI-compatible chat completion APIs.

use std::time::Duration;

use async_trait::async_trait;
use rt_config::OpenAiConfig;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::http::check_response;
use crate::reply::parse_json_reply;
use crate::{ChatClient, ChatRequest};

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP chat client configured from [`OpenAiConfig`].
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Build a client from config.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::NotConfigured`] without an API key, or
    /// [`LlmError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self, LlmError> {
        if !config.is_configured() {
            return Err(LlmError::NotConfigured);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn body<'a>(&'a self, request: &'a ChatRequest) -> CompletionBody<'a> {
        CompletionBody {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature.unwrap_or(self.temperature),
            max_tokens: request.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete_json(&self, request: ChatRequest) -> Result<serde_json::Value, LlmError> {
        tracing::debug!(model = %self.model, prompt_chars = request.user.len(), "chat completion");
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.body(&request))
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let completion: CompletionResponse = resp.json().await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyReply)?;
        parse_json_reply(&content)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
