use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SourceType;

/// An information source with an optional MOSES assessment (raw JSON text).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Source {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub source_type: SourceType,
    pub description: Option<String>,
    pub moses_assessment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
