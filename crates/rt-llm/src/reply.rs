//! Reply parsing.
//!
//! Models sometimes wrap JSON in Markdown fences even when asked for a JSON
//! object, so [`parse_json_reply`] strips them first. The typed replies
//! default every missing field; a partial answer is still usable.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Upper bound on hypotheses accepted from a suggestion.
pub const MAX_SUGGESTED_HYPOTHESES: usize = 6;

/// Parse a completion as JSON, tolerating a surrounding code fence.
///
/// # Errors
///
/// Returns [`LlmError::InvalidJson`] when the text is not JSON.
pub fn parse_json_reply(raw: &str) -> Result<serde_json::Value, LlmError> {
    let trimmed = strip_code_fence(raw.trim());
    serde_json::from_str(trimmed).map_err(|e| LlmError::InvalidJson(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line.
    let body = rest.find('\n').map_or("", |nl| &rest[nl + 1..]);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Decode a parsed reply into one of the typed shapes below.
///
/// # Errors
///
/// Returns [`LlmError::InvalidJson`] when a present field has the wrong type.
pub fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T, LlmError> {
    serde_json::from_value(value).map_err(|e| LlmError::InvalidJson(e.to_string()))
}

// ---------------------------------------------------------------------------
// Content intelligence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedEntities {
    pub people: Vec<String>,
    pub organizations: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedClaim {
    pub claim: String,
    /// 0-100, higher means more likely deceptive.
    pub risk_score: f64,
    pub red_flags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentIntelligenceReply {
    pub summary: String,
    pub entities: ExtractedEntities,
    pub claims: Vec<ExtractedClaim>,
}

impl ContentIntelligenceReply {
    /// The stored claim-analysis document, in the shape the deception
    /// aggregator and claim adjustments read.
    #[must_use]
    pub fn claim_analysis_document(&self) -> serde_json::Value {
        let claims: Vec<serde_json::Value> = self
            .claims
            .iter()
            .map(|c| {
                serde_json::json!({
                    "claim": c.claim,
                    "deception_analysis": {
                        "risk_score": c.risk_score,
                        "red_flags": c.red_flags,
                    },
                })
            })
            .collect();
        serde_json::json!({ "claims": claims })
    }
}

// ---------------------------------------------------------------------------
// ACH suggestions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AchSuggestionReply {
    pub hypotheses: Vec<String>,
    pub evidence: Vec<String>,
}

impl AchSuggestionReply {
    /// Drop blank entries and cap the hypothesis count.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.hypotheses.retain(|h| !h.trim().is_empty());
        self.hypotheses.truncate(MAX_SUGGESTED_HYPOTHESES);
        self.evidence.retain(|e| !e.trim().is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn plain_json_parses() {
        assert_eq!(parse_json_reply(r#" {"a": 1} "#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn fenced_json_parses() {
        let raw = "```json\n{\"summary\": \"x\"}\n```";
        assert_eq!(parse_json_reply(raw).unwrap(), json!({"summary": "x"}));
        let bare = "```\n[1, 2]\n```\n";
        assert_eq!(parse_json_reply(bare).unwrap(), json!([1, 2]));
    }

    #[test]
    fn prose_is_invalid() {
        assert!(matches!(
            parse_json_reply("Sure! Here are your hypotheses."),
            Err(LlmError::InvalidJson(_))
        ));
    }

    #[test]
    fn missing_fields_default() {
        let reply: ContentIntelligenceReply =
            decode(json!({"summary": "short", "claims": [{"claim": "c"}]})).unwrap();
        assert_eq!(reply.summary, "short");
        assert!(reply.entities.people.is_empty());
        assert_eq!(reply.claims[0].risk_score, 0.0);
    }

    #[test]
    fn wrong_field_type_is_invalid() {
        let result: Result<ContentIntelligenceReply, _> = decode(json!({"claims": "none"}));
        assert!(matches!(result, Err(LlmError::InvalidJson(_))));
    }

    #[test]
    fn claim_document_nests_risk_under_deception_analysis() {
        let reply = ContentIntelligenceReply {
            claims: vec![ExtractedClaim {
                claim: "Ceasefire holds".into(),
                risk_score: 72.0,
                red_flags: vec!["single source".into()],
            }],
            ..Default::default()
        };
        assert_eq!(
            reply.claim_analysis_document(),
            json!({"claims": [{
                "claim": "Ceasefire holds",
                "deception_analysis": {"risk_score": 72.0, "red_flags": ["single source"]}
            }]})
        );
    }

    #[test]
    fn suggestions_are_capped_and_cleaned() {
        let reply = AchSuggestionReply {
            hypotheses: (0..9).map(|i| format!("H{i}")).chain([String::new()]).collect(),
            evidence: vec!["  ".into(), "E1".into()],
        }
        .normalized();
        assert_eq!(reply.hypotheses.len(), MAX_SUGGESTED_HYPOTHESES);
        assert_eq!(reply.evidence, vec!["E1"]);
    }
}
