use rt_config::ResearchConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CleanupArgs;
use crate::commands::open_service;
use crate::output::output;

/// Handle `rtools cleanup`.
pub async fn handle(
    args: &CleanupArgs,
    config: &ResearchConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let retention_days = args
        .retention_days
        .unwrap_or(config.cleanup.retention_days);
    let service = open_service(config).await?;
    let report = rt_server::cleanup::run_cleanup(&service, retention_days).await?;
    output(&report, flags.format)
}
