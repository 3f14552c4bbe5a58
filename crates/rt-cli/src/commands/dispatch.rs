use rt_config::ResearchConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: ResearchConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Serve(args) => commands::serve::handle(&args, config).await,
        Commands::Account { action } => commands::account::handle(&action, &config, flags).await,
        Commands::Ach { action } => commands::ach::handle(&action, &config, flags).await,
        Commands::Risk(args) => commands::risk::handle(&args, &config, flags).await,
        Commands::Cleanup(args) => commands::cleanup::handle(&args, &config, flags).await,
    }
}
