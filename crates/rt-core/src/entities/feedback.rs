use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::FeedbackCategory;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Feedback {
    pub id: String,
    pub account_hash: Option<String>,
    pub category: FeedbackCategory,
    pub message: String,
    pub page: Option<String>,
    pub created_at: DateTime<Utc>,
}
