use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use rt_core::enums::AccountRole;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Account administration against the local database.
    Account {
        #[command(subcommand)]
        action: AccountCommands,
    },
    /// ACH analyses.
    Ach {
        #[command(subcommand)]
        action: AchCommands,
    },
    /// Print the deception risk report for a workspace.
    Risk(RiskArgs),
    /// Delete unsaved content analyses past the retention window.
    Cleanup(CleanupArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Socket address to bind (overrides `server.bind`)
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Debug, Subcommand)]
pub enum AccountCommands {
    /// Generate a new account hash.
    Register {
        /// Platform role for the new account
        #[arg(long, value_enum, default_value = "analyst")]
        role: RoleArg,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Analyst,
    Researcher,
}

impl From<RoleArg> for AccountRole {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Self::Admin,
            RoleArg::Analyst => Self::Analyst,
            RoleArg::Researcher => Self::Researcher,
        }
    }
}

#[derive(Clone, Debug, Subcommand)]
pub enum AchCommands {
    /// Score an exported analysis file without touching the database.
    Score {
        /// JSON file holding `hypotheses` and `evidence`
        file: PathBuf,
    },
    /// Score a stored analysis by id.
    Show {
        /// ACH analysis id
        id: String,
    },
}

#[derive(Clone, Debug, Args)]
pub struct RiskArgs {
    /// Workspace id
    pub workspace_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct CleanupArgs {
    /// Retention in days (overrides `cleanup.retention_days`)
    #[arg(long)]
    pub retention_days: Option<u32>,
}
