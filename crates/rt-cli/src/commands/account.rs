use rt_config::ResearchConfig;
use rt_core::responses::RegisterResponse;

use crate::cli::{AccountCommands, GlobalFlags};
use crate::commands::open_service;
use crate::output::output;

/// Handle `rtools account`.
pub async fn handle(
    action: &AccountCommands,
    config: &ResearchConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AccountCommands::Register { role } => {
            let service = open_service(config).await?;
            let account = service.register_account((*role).into()).await?;
            output(&RegisterResponse::new(account.account_hash), flags.format)
        }
    }
}
