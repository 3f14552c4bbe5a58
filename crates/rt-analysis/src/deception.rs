//! Workspace-level deception risk aggregation.
//!
//! Five categories feed the overall score:
//!
//! | Category | Input                                   | Native scale |
//! |----------|-----------------------------------------|--------------|
//! | MOM      | actor `deception_profile.mom`           | 0-5          |
//! | POP      | actor `deception_profile.pop`           | 0-5 (lookup) |
//! | EVE      | not collected yet, always empty         | 0-5          |
//! | MOSES    | source `moses_assessment`               | 0-5          |
//! | Claims   | content `claim_analysis` + adjustments  | 0-100        |
//!
//! Each category average is lifted to 0-100 and weighted. Profiles are raw
//! JSON text; one malformed entity is logged and left out of its category,
//! and aggregation itself never fails.

use std::collections::BTreeMap;
use std::fmt;

use rt_core::entities::{Actor, Source};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MOM_WEIGHT: f64 = 0.25;
pub const POP_WEIGHT: f64 = 0.20;
pub const EVE_WEIGHT: f64 = 0.25;
pub const MOSES_WEIGHT: f64 = 0.15;
pub const CLAIMS_WEIGHT: f64 = 0.15;

/// Multiplier lifting a 0-5 average onto the 0-100 scale.
pub const FIVE_POINT_TO_PERCENT: f64 = 20.0;

pub const MAX_ALERTS: usize = 10;

/// POP `overall_risk_level` to numeric score.
pub const POP_LEVEL_SCORES: &[(&str, f64)] = &[("high", 4.0), ("medium", 3.0), ("low", 2.0)];

const FIVE_POINT_MAX: f64 = 5.0;
const CLAIM_MAX: f64 = 100.0;

const MOM_CRITICAL_ALERT: f64 = 4.5;
const MOSES_HIGH_ALERT: f64 = 4.0;
const CLAIM_CRITICAL_ALERT: f64 = 75.0;
const CLAIM_HIGH_ALERT: f64 = 60.0;

/// Look up the numeric score for a POP level, case-insensitively.
#[must_use]
pub fn pop_level_score(level: &str) -> Option<f64> {
    let level = level.trim().to_ascii_lowercase();
    POP_LEVEL_SCORES
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, score)| *score)
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket an overall 0-100 score.
    #[must_use]
    pub const fn from_score(score: u32) -> Self {
        match score {
            75.. => Self::Critical,
            60..=74 => Self::High,
            40..=59 => Self::Medium,
            _ => Self::Low,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskCategory {
    Mom,
    Pop,
    Eve,
    Moses,
    Claims,
}

impl RiskCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mom => "MOM",
            Self::Pop => "POP",
            Self::Eve => "EVE",
            Self::Moses => "MOSES",
            Self::Claims => "CLAIMS",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Average and high/medium/low distribution for MOM, POP, and claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategorySummary {
    pub average: f64,
    pub count: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MosesSummary {
    pub average: f64,
    pub count: u32,
    pub compromised: u32,
    pub unreliable: u32,
    pub solid: u32,
}

/// EVE has no data collection yet and always reports zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EveSummary {
    pub average: f64,
    pub count: u32,
    pub implemented: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskAlert {
    pub severity: AlertSeverity,
    pub category: RiskCategory,
    pub entity_id: String,
    pub entity_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_index: Option<u32>,
    /// Score on the category's native scale (0-5 or 0-100).
    pub score: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeceptionRiskReport {
    pub overall_risk_score: u32,
    pub risk_level: RiskLevel,
    pub mom: CategorySummary,
    pub pop: CategorySummary,
    pub eve: EveSummary,
    pub moses: MosesSummary,
    pub claims: CategorySummary,
    pub alerts: Vec<RiskAlert>,
    /// Entity contributions left out because their JSON was unusable.
    pub skipped: u32,
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Claims of one content analysis together with analyst overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentClaims {
    pub content_id: String,
    pub title: Option<String>,
    pub claim_analysis: Option<String>,
    /// Adjusted risk score per claim index; replaces the stored score.
    pub adjustments: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeceptionInputs<'a> {
    pub actors: &'a [Actor],
    pub sources: &'a [Source],
    pub contents: &'a [ContentClaims],
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
enum Malformed {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{0}` is not a JSON object")]
    NotObject(&'static str),
    #[error("`{0}` is not a JSON array")]
    NotArray(&'static str),
    #[error("`{0}` is missing or not a number")]
    NotNumeric(&'static str),
    #[error("`{field}` = {value} is outside 0..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[error("unknown risk level `{0}`")]
    UnknownLevel(String),
}

fn parse_object(raw: &str, what: &'static str) -> Result<Map<String, Value>, Malformed> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(Malformed::NotObject(what)),
    }
}

fn as_object<'v>(value: &'v Value, what: &'static str) -> Result<&'v Map<String, Value>, Malformed> {
    value.as_object().ok_or(Malformed::NotObject(what))
}

fn bounded(value: Option<&Value>, field: &'static str, max: f64) -> Result<f64, Malformed> {
    let value = value
        .and_then(Value::as_f64)
        .ok_or(Malformed::NotNumeric(field))?;
    if (0.0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Malformed::OutOfRange { field, value, max })
    }
}

/// Section present and not null.
fn section<'v>(doc: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    doc.get(key).filter(|v| !v.is_null())
}

fn mom_score(mom: &Value) -> Result<f64, Malformed> {
    let mom = as_object(mom, "mom")?;
    let motive = bounded(mom.get("motive"), "motive", FIVE_POINT_MAX)?;
    let opportunity = bounded(mom.get("opportunity"), "opportunity", FIVE_POINT_MAX)?;
    let means = bounded(mom.get("means"), "means", FIVE_POINT_MAX)?;
    Ok((motive + opportunity + means) / 3.0)
}

fn pop_score(pop: &Value) -> Result<f64, Malformed> {
    let pop = as_object(pop, "pop")?;
    let level = pop
        .get("overall_risk_level")
        .and_then(Value::as_str)
        .ok_or(Malformed::NotNumeric("overall_risk_level"))?;
    pop_level_score(level).ok_or_else(|| Malformed::UnknownLevel(level.to_string()))
}

fn moses_score(assessment: &Map<String, Value>) -> Result<f64, Malformed> {
    let vulnerability = bounded(
        assessment.get("source_vulnerability"),
        "source_vulnerability",
        FIVE_POINT_MAX,
    )?;
    let manipulation = bounded(
        assessment.get("manipulation_evidence"),
        "manipulation_evidence",
        FIVE_POINT_MAX,
    )?;
    Ok((vulnerability + manipulation) / 2.0)
}

fn claim_risk(claim: &Value) -> Result<f64, Malformed> {
    let claim = as_object(claim, "claim")?;
    let risk = claim
        .get("deception_analysis")
        .and_then(|analysis| analysis.get("risk_score"));
    bounded(risk, "risk_score", CLAIM_MAX)
}

fn claim_text(claim: &Value) -> Option<&str> {
    claim.get("claim").and_then(Value::as_str)
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Running {
    sum: f64,
    count: u32,
}

impl Running {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / f64::from(self.count)
        }
    }
}

/// Three-way bucket on the 0-5 scale: high at 4.0, medium at 3.0.
fn bucket_five_point(summary: &mut CategorySummary, score: f64) {
    if score >= 4.0 {
        summary.high += 1;
    } else if score >= 3.0 {
        summary.medium += 1;
    } else {
        summary.low += 1;
    }
}

fn bucket_claim(summary: &mut CategorySummary, score: f64) {
    if score > 60.0 {
        summary.high += 1;
    } else if score > 30.0 {
        summary.medium += 1;
    } else {
        summary.low += 1;
    }
}

#[derive(Debug, Default)]
struct Aggregation {
    mom: Running,
    pop: Running,
    moses: Running,
    claims: Running,
    mom_summary: CategorySummary,
    pop_summary: CategorySummary,
    moses_summary: MosesSummary,
    claims_summary: CategorySummary,
    alerts: Vec<RiskAlert>,
    skipped: u32,
}

impl Aggregation {
    fn skip(&mut self, category: RiskCategory, entity_id: &str, err: &Malformed) {
        tracing::warn!(%category, entity_id, error = %err, "excluding entity from deception risk");
        self.skipped += 1;
    }

    fn add_actor(&mut self, actor: &Actor) {
        let Some(raw) = non_blank(actor.deception_profile.as_deref()) else {
            return;
        };
        let profile = match parse_object(raw, "deception_profile") {
            Ok(profile) => profile,
            Err(err) => {
                self.skip(RiskCategory::Mom, &actor.id, &err);
                return;
            }
        };

        if let Some(mom) = section(&profile, "mom") {
            match mom_score(mom) {
                Ok(score) => {
                    self.mom.push(score);
                    bucket_five_point(&mut self.mom_summary, score);
                    if score >= MOM_CRITICAL_ALERT {
                        self.alerts.push(RiskAlert {
                            severity: AlertSeverity::Critical,
                            category: RiskCategory::Mom,
                            entity_id: actor.id.clone(),
                            entity_name: actor.name.clone(),
                            claim_index: None,
                            score,
                            message: format!(
                                "Actor '{}' has motive, opportunity, and means averaging {score:.1}",
                                actor.name
                            ),
                        });
                    }
                }
                Err(err) => self.skip(RiskCategory::Mom, &actor.id, &err),
            }
        }

        if let Some(pop) = section(&profile, "pop") {
            match pop_score(pop) {
                Ok(score) => {
                    self.pop.push(score);
                    bucket_five_point(&mut self.pop_summary, score);
                }
                Err(err) => self.skip(RiskCategory::Pop, &actor.id, &err),
            }
        }
    }

    fn add_source(&mut self, source: &Source) {
        let Some(raw) = non_blank(source.moses_assessment.as_deref()) else {
            return;
        };
        let score = match parse_object(raw, "moses_assessment").and_then(|a| moses_score(&a)) {
            Ok(score) => score,
            Err(err) => {
                self.skip(RiskCategory::Moses, &source.id, &err);
                return;
            }
        };

        self.moses.push(score);
        if score >= 4.0 {
            self.moses_summary.compromised += 1;
        } else if score >= 3.0 {
            self.moses_summary.unreliable += 1;
        } else {
            self.moses_summary.solid += 1;
        }
        if score >= MOSES_HIGH_ALERT {
            self.alerts.push(RiskAlert {
                severity: AlertSeverity::High,
                category: RiskCategory::Moses,
                entity_id: source.id.clone(),
                entity_name: source.name.clone(),
                claim_index: None,
                score,
                message: format!(
                    "Source '{}' may be compromised (MOSES {score:.1})",
                    source.name
                ),
            });
        }
    }

    fn add_content(&mut self, content: &ContentClaims) {
        let Some(raw) = non_blank(content.claim_analysis.as_deref()) else {
            return;
        };
        let analysis = match parse_object(raw, "claim_analysis") {
            Ok(analysis) => analysis,
            Err(err) => {
                self.skip(RiskCategory::Claims, &content.content_id, &err);
                return;
            }
        };
        let Some(claims) = section(&analysis, "claims") else {
            return;
        };
        let Some(claims) = claims.as_array() else {
            self.skip(
                RiskCategory::Claims,
                &content.content_id,
                &Malformed::NotArray("claims"),
            );
            return;
        };

        let name = content
            .title
            .clone()
            .unwrap_or_else(|| content.content_id.clone());

        for (index, claim) in (0_u32..).zip(claims) {
            let score = match content.adjustments.get(&index) {
                Some(adjusted) => bounded(
                    Some(&Value::from(*adjusted)),
                    "adjusted_risk_score",
                    CLAIM_MAX,
                ),
                None => claim_risk(claim),
            };
            let score = match score {
                Ok(score) => score,
                Err(err) => {
                    self.skip(RiskCategory::Claims, &content.content_id, &err);
                    continue;
                }
            };

            self.claims.push(score);
            bucket_claim(&mut self.claims_summary, score);

            let severity = if score > CLAIM_CRITICAL_ALERT {
                Some(AlertSeverity::Critical)
            } else if score > CLAIM_HIGH_ALERT {
                Some(AlertSeverity::High)
            } else {
                None
            };
            if let Some(severity) = severity {
                let text = claim_text(claim).unwrap_or("(no claim text)");
                self.alerts.push(RiskAlert {
                    severity,
                    category: RiskCategory::Claims,
                    entity_id: content.content_id.clone(),
                    entity_name: name.clone(),
                    claim_index: Some(index),
                    score,
                    message: format!("Claim \"{text}\" has deception risk {score:.0}"),
                });
            }
        }
    }

    fn finish(mut self) -> DeceptionRiskReport {
        let mom_avg = self.mom.average();
        let pop_avg = self.pop.average();
        let eve = EveSummary::default();
        let moses_avg = self.moses.average();
        let claims_avg = self.claims.average();

        let weighted = mom_avg * FIVE_POINT_TO_PERCENT * MOM_WEIGHT
            + pop_avg * FIVE_POINT_TO_PERCENT * POP_WEIGHT
            + eve.average * FIVE_POINT_TO_PERCENT * EVE_WEIGHT
            + moses_avg * FIVE_POINT_TO_PERCENT * MOSES_WEIGHT
            + claims_avg * CLAIMS_WEIGHT;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let overall = weighted.round().clamp(0.0, 100.0) as u32;

        self.alerts.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.alerts.truncate(MAX_ALERTS);

        DeceptionRiskReport {
            overall_risk_score: overall,
            risk_level: RiskLevel::from_score(overall),
            mom: CategorySummary {
                average: mom_avg,
                count: self.mom.count,
                ..self.mom_summary
            },
            pop: CategorySummary {
                average: pop_avg,
                count: self.pop.count,
                ..self.pop_summary
            },
            eve,
            moses: MosesSummary {
                average: moses_avg,
                count: self.moses.count,
                ..self.moses_summary
            },
            claims: CategorySummary {
                average: claims_avg,
                count: self.claims.count,
                ..self.claims_summary
            },
            alerts: self.alerts,
            skipped: self.skipped,
        }
    }
}

/// Roll every actor, source, and claim in a workspace into one report.
#[must_use]
pub fn aggregate_deception_risk(inputs: &DeceptionInputs<'_>) -> DeceptionRiskReport {
    let mut agg = Aggregation::default();
    for actor in inputs.actors {
        agg.add_actor(actor);
    }
    for source in inputs.sources {
        agg.add_source(source);
    }
    for content in inputs.contents {
        agg.add_content(content);
    }
    agg.finish()
}
