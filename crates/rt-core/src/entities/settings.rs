use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Free-form per-account preferences (theme, language, AI defaults).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AccountSettings {
    pub account_hash: String,
    pub settings: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
