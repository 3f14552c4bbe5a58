use std::sync::Arc;

use rt_config::ResearchConfig;
use rt_db::service::ResearchService;
use rt_llm::{ChatClient, OpenAiClient};

use crate::error::ApiError;

/// Shared state behind every handler.
pub struct AppState {
    pub service: ResearchService,
    pub config: ResearchConfig,
    /// `None` when no API key is configured; LLM endpoints then fail with 502.
    pub llm: Option<Arc<dyn ChatClient>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        service: ResearchService,
        config: ResearchConfig,
        llm: Option<Arc<dyn ChatClient>>,
    ) -> Self {
        Self {
            service,
            config,
            llm,
        }
    }

    /// Open the configured database and build the OpenAI client if a key is set.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened or the HTTP client cannot be built.
    pub async fn open(config: ResearchConfig) -> anyhow::Result<Self> {
        let service = ResearchService::open_local(&config.database.path).await?;
        let llm: Option<Arc<dyn ChatClient>> = if config.openai.is_configured() {
            let client = OpenAiClient::from_config(&config.openai)?;
            tracing::info!(model = %config.openai.model, "LLM client configured");
            Some(Arc::new(client))
        } else {
            tracing::warn!("openai.api_key not set; content analysis and ACH suggestions are disabled");
            None
        };
        Ok(Self::new(service, config, llm))
    }

    /// The LLM client, or an upstream error when none is configured.
    pub(crate) fn llm(&self) -> Result<&dyn ChatClient, ApiError> {
        self.llm
            .as_deref()
            .ok_or_else(|| ApiError::Upstream("LLM is not configured".to_string()))
    }

    /// Clamp a requested page size to the configured bounds.
    pub(crate) fn limit(&self, requested: Option<u32>) -> u32 {
        self.config.general.effective_limit(requested)
    }
}
