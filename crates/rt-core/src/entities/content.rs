use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Result of running the content-intelligence pipeline over a text.
///
/// `claim_analysis` is kept as raw JSON text because claim risk scores are
/// re-read during deception aggregation, where malformed JSON is tolerated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ContentAnalysis {
    pub id: String,
    pub workspace_id: String,
    pub url: Option<String>,
    pub title: Option<String>,
    pub content_text: String,
    pub summary: Option<String>,
    pub entities: serde_json::Value,
    pub claim_analysis: Option<String>,
    pub is_saved: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Analyst override of one claim's risk score.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ClaimAdjustment {
    pub id: String,
    pub content_analysis_id: String,
    pub claim_index: u32,
    pub original_risk_score: Option<f64>,
    pub adjusted_risk_score: f64,
    pub reason: Option<String>,
    pub adjusted_by: String,
    pub created_at: DateTime<Utc>,
}
