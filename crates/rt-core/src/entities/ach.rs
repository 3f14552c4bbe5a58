use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::enums::{AchScaleType, AchScore, AnalysisStatus};

/// A candidate explanation inside an ACH analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Hypothesis {
    pub id: String,
    pub text: String,
}

/// One evidence item and its score against each hypothesis.
///
/// A hypothesis missing from `hypotheses_scores` is "absent" for this item
/// and is not counted at all. Deserialization drops `null`, empty, and
/// unrecognized score values instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Evidence {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Significance on the analysis scale; `None` counts as `1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u8>,
    #[serde(default, deserialize_with = "lenient_scores")]
    pub hypotheses_scores: BTreeMap<String, AchScore>,
}

impl Evidence {
    /// Score of this evidence against `hypothesis_id`, if set.
    #[must_use]
    pub fn score_for(&self, hypothesis_id: &str) -> Option<AchScore> {
        self.hypotheses_scores.get(hypothesis_id).copied()
    }

    #[must_use]
    pub fn effective_weight(&self) -> u8 {
        self.weight.unwrap_or(1)
    }
}

fn lenient_scores<'de, D>(deserializer: D) -> Result<BTreeMap<String, AchScore>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(hypothesis_id, value)| {
            value
                .as_str()
                .and_then(AchScore::parse)
                .map(|score| (hypothesis_id, score))
        })
        .collect())
}

/// A full ACH analysis with hypotheses and evidence in display order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AchAnalysis {
    pub id: String,
    pub workspace_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub scale_type: AchScaleType,
    pub status: AnalysisStatus,
    #[serde(default)]
    pub hypotheses: Vec<Hypothesis>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List view of an ACH analysis without its matrix.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AchAnalysisSummary {
    pub id: String,
    pub workspace_id: String,
    pub title: String,
    pub scale_type: AchScaleType,
    pub status: AnalysisStatus,
    pub hypothesis_count: u32,
    pub evidence_count: u32,
    pub updated_at: DateTime<Utc>,
}
