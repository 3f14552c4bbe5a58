//! # rt-config
//!
//! Layered configuration loading for ResearchTools using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`RESEARCHTOOLS_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `.researchtools/config.toml`
//! 4. User-level `~/.config/researchtools/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `RESEARCHTOOLS_OPENAI__API_KEY` -> `openai.api_key`,
//! `RESEARCHTOOLS_SERVER__BIND` -> `server.bind`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use rt_config::ResearchConfig;
//!
//! let config = ResearchConfig::load_with_dotenv(None).expect("config");
//! if config.openai.is_configured() {
//!     println!("LLM model: {}", config.openai.model);
//! }
//! ```

mod cleanup;
mod database;
mod error;
mod general;
mod openai;
mod server;

pub use cleanup::CleanupConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use openai::OpenAiConfig;
pub use server::ServerConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "RESEARCHTOOLS_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl ResearchConfig {
    /// Load configuration from all sources and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory (if any), then [`Self::load`].
    pub fn load_with_dotenv(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(explicit)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or layer more providers on top.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".researchtools/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // An explicit path is merged even when missing so figment reports it.
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Reject combinations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.default_limit == 0 {
            return Err(ConfigError::invalid(
                "general.default_limit",
                "must be greater than zero",
            ));
        }
        if self.general.default_limit > self.general.max_limit {
            return Err(ConfigError::invalid(
                "general.default_limit",
                format!(
                    "{} exceeds general.max_limit ({})",
                    self.general.default_limit, self.general.max_limit
                ),
            ));
        }
        if self.cleanup.retention_days == 0 {
            return Err(ConfigError::invalid(
                "cleanup.retention_days",
                "must be at least one day",
            ));
        }
        if self.cleanup.interval_hours == 0 {
            return Err(ConfigError::invalid(
                "cleanup.interval_hours",
                "must be at least one hour",
            ));
        }
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            return Err(ConfigError::invalid(
                "openai.temperature",
                format!("{} is outside 0.0..=2.0", self.openai.temperature),
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("researchtools").join("config.toml"))
    }
}
