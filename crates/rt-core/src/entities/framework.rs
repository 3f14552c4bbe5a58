use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AnalysisStatus, FrameworkType};

/// A saved run of one catalog framework. The framework-specific payload
/// lives in `data` and is not interpreted by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FrameworkSession {
    pub id: String,
    pub workspace_id: String,
    pub framework_type: FrameworkType,
    pub title: String,
    pub description: Option<String>,
    pub data: serde_json::Value,
    pub status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
