//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints and commands.
const fn default_limit() -> u32 {
    50
}

/// Hard ceiling on any requested page size.
const fn default_max_limit() -> u32 {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Page size used when a request does not pass `limit`.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Requested limits above this are clamped.
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl GeneralConfig {
    /// Resolve a caller-supplied limit: default when absent, clamped to
    /// `1..=max_limit` otherwise.
    #[must_use]
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}
