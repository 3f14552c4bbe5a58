//! Scheduled cleanup of unsaved content analyses.

use serde::{Deserialize, Serialize};

const fn default_retention_days() -> u32 {
    7
}

const fn default_interval_hours() -> u64 {
    24
}

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CleanupConfig {
    /// Unsaved content analyses older than this many days are deleted.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Whether `serve` starts the background cleanup task.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            interval_hours: default_interval_hours(),
            enabled: default_enabled(),
        }
    }
}
