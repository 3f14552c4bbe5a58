pub mod account;
pub mod ach;
pub mod cleanup;
pub mod dispatch;
pub mod risk;
pub mod serve;

use rt_config::ResearchConfig;
use rt_db::service::ResearchService;

/// Open the configured database for a one-shot command.
pub async fn open_service(config: &ResearchConfig) -> anyhow::Result<ResearchService> {
    let service = ResearchService::open_local(&config.database.path).await?;
    tracing::debug!(path = %config.database.path, "opened database");
    Ok(service)
}
