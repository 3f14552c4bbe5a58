use std::sync::Arc;

use rt_config::ResearchConfig;
use rt_server::AppState;

use crate::cli::root_commands::ServeArgs;

/// Handle `rtools serve`.
pub async fn handle(args: &ServeArgs, mut config: ResearchConfig) -> anyhow::Result<()> {
    if let Some(bind) = &args.bind {
        config.server.bind.clone_from(bind);
    }
    let bind = config.server.bind.clone();

    if !config.openai.is_configured() {
        tracing::warn!("OpenAI is not configured; content analysis and ACH suggestions will fail");
    }

    let state = Arc::new(AppState::open(config).await?);
    rt_server::serve(state, &bind).await
}
