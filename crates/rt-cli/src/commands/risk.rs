use rt_config::ResearchConfig;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RiskArgs;
use crate::commands::open_service;
use crate::output::output;

/// Handle `rtools risk`.
pub async fn handle(
    args: &RiskArgs,
    config: &ResearchConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = open_service(config).await?;
    let report = service.deception_risk(&args.workspace_id).await?;
    output(&report, flags.format)
}
