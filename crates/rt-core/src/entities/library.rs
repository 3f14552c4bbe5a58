use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FrameworkType;

/// A framework snapshot published to the public library.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LibraryFramework {
    pub id: String,
    pub framework_session_id: Option<String>,
    pub framework_type: FrameworkType,
    pub title: String,
    pub description: Option<String>,
    pub data: serde_json::Value,
    pub author_hash: String,
    pub view_count: u64,
    pub fork_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
