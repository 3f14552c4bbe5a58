//! Status enums, entity kinds, roles, and actions for ResearchTools.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AnalysisStatus
// ---------------------------------------------------------------------------

/// Lifecycle of an ACH analysis or framework session.
///
/// ```text
/// draft → in_progress → completed → in_progress (re-opened)
///   any non-archived state → archived
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Draft,
    InProgress,
    Completed,
    Archived,
}

impl AnalysisStatus {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::InProgress, Self::Archived],
            Self::InProgress => &[Self::Completed, Self::Archived],
            Self::Completed => &[Self::InProgress, Self::Archived],
            Self::Archived => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FrameworkType
// ---------------------------------------------------------------------------

/// Structured analytic technique offered by the framework catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkType {
    Swot,
    Cog,
    PmesiiPt,
    Dotmlpf,
    Ach,
    Deception,
    Behavioral,
    Starbursting,
    Causeway,
    Dime,
    Pest,
    Vrio,
    Stakeholder,
    Trend,
    Surveillance,
    FundamentalFlow,
}

impl FrameworkType {
    pub const ALL: [Self; 16] = [
        Self::Swot,
        Self::Cog,
        Self::PmesiiPt,
        Self::Dotmlpf,
        Self::Ach,
        Self::Deception,
        Self::Behavioral,
        Self::Starbursting,
        Self::Causeway,
        Self::Dime,
        Self::Pest,
        Self::Vrio,
        Self::Stakeholder,
        Self::Trend,
        Self::Surveillance,
        Self::FundamentalFlow,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swot => "swot",
            Self::Cog => "cog",
            Self::PmesiiPt => "pmesii_pt",
            Self::Dotmlpf => "dotmlpf",
            Self::Ach => "ach",
            Self::Deception => "deception",
            Self::Behavioral => "behavioral",
            Self::Starbursting => "starbursting",
            Self::Causeway => "causeway",
            Self::Dime => "dime",
            Self::Pest => "pest",
            Self::Vrio => "vrio",
            Self::Stakeholder => "stakeholder",
            Self::Trend => "trend",
            Self::Surveillance => "surveillance",
            Self::FundamentalFlow => "fundamental_flow",
        }
    }

    /// Human-readable catalog title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Swot => "SWOT Analysis",
            Self::Cog => "Center of Gravity Analysis",
            Self::PmesiiPt => "PMESII-PT",
            Self::Dotmlpf => "DOTMLPF",
            Self::Ach => "Analysis of Competing Hypotheses",
            Self::Deception => "Deception Detection (SATS)",
            Self::Behavioral => "Behavioral Analysis",
            Self::Starbursting => "Starbursting",
            Self::Causeway => "Causeway",
            Self::Dime => "DIME",
            Self::Pest => "PEST Analysis",
            Self::Vrio => "VRIO",
            Self::Stakeholder => "Stakeholder Analysis",
            Self::Trend => "Trend Analysis",
            Self::Surveillance => "Surveillance Detection",
            Self::FundamentalFlow => "Fundamental Flow",
        }
    }
}

impl fmt::Display for FrameworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AchScore
// ---------------------------------------------------------------------------

/// Qualitative relation of one evidence item to one hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AchScore {
    Supports,
    Contradicts,
    Neutral,
    NotApplicable,
}

impl AchScore {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supports => "supports",
            Self::Contradicts => "contradicts",
            Self::Neutral => "neutral",
            Self::NotApplicable => "not_applicable",
        }
    }

    /// Parse a stored score. Returns `None` for anything unrecognized,
    /// including the empty string.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "supports" => Some(Self::Supports),
            "contradicts" => Some(Self::Contradicts),
            "neutral" => Some(Self::Neutral),
            "not_applicable" => Some(Self::NotApplicable),
            _ => None,
        }
    }

    /// Signed contribution to a weighted score: `+1`, `-1`, or `0`.
    #[must_use]
    pub const fn rating(self) -> i64 {
        match self {
            Self::Supports => 1,
            Self::Contradicts => -1,
            Self::Neutral | Self::NotApplicable => 0,
        }
    }

    /// Matrix cell symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Supports => "+",
            Self::Contradicts => "-",
            Self::Neutral => "0",
            Self::NotApplicable => "NA",
        }
    }
}

impl fmt::Display for AchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AchScaleType
// ---------------------------------------------------------------------------

/// Scoring scale selected for an ACH analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AchScaleType {
    #[default]
    Logarithmic,
    Linear,
}

impl AchScaleType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logarithmic => "logarithmic",
            Self::Linear => "linear",
        }
    }

    /// Evidence weights allowed on this scale, ascending. Unweighted
    /// evidence counts as `1`, the lowest weight on both scales.
    #[must_use]
    pub const fn weights(self) -> &'static [u8] {
        match self {
            Self::Logarithmic => &[1, 3, 5, 8, 12],
            Self::Linear => &[1, 2, 3, 4, 5],
        }
    }

    #[must_use]
    pub fn accepts_weight(self, weight: u8) -> bool {
        self.weights().contains(&weight)
    }
}

impl fmt::Display for AchScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AccountRole
// ---------------------------------------------------------------------------

/// Platform role attached to an account hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Admin,
    #[default]
    Analyst,
    Researcher,
}

impl AccountRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Analyst => "analyst",
            Self::Researcher => "researcher",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// MemberRole
// ---------------------------------------------------------------------------

/// Role of an account inside a workspace.
///
/// Ordered by privilege: `viewer < editor < owner`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Viewer,
    Editor,
    Owner,
}

impl MemberRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Editor => "editor",
            Self::Owner => "owner",
        }
    }

    /// Whether this role may create or modify workspace content.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::Editor | Self::Owner)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActorType / SourceType
// ---------------------------------------------------------------------------

/// Kind of actor tracked in a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    Person,
    Organization,
    Unit,
    Government,
    Group,
    #[default]
    Other,
}

impl ActorType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Organization => "organization",
            Self::Unit => "unit",
            Self::Government => "government",
            Self::Group => "group",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of information source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Human,
    Technical,
    Document,
    OpenSource,
    #[default]
    Other,
}

impl SourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Technical => "technical",
            Self::Document => "document",
            Self::OpenSource => "open_source",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FeedbackCategory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Bug,
    Feature,
    #[default]
    General,
}

impl FeedbackCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::General => "general",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActivityAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Created,
    Updated,
    StatusChanged,
    Deleted,
    Published,
    Forked,
    Adjusted,
}

impl ActivityAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Deleted => "deleted",
            Self::Published => "published",
            Self::Forked => "forked",
            Self::Adjusted => "adjusted",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Account,
    Workspace,
    Actor,
    Source,
    Framework,
    AchAnalysis,
    AchHypothesis,
    AchEvidence,
    ContentAnalysis,
    ClaimAdjustment,
    Library,
    Feedback,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Workspace => "workspace",
            Self::Actor => "actor",
            Self::Source => "source",
            Self::Framework => "framework",
            Self::AchAnalysis => "ach_analysis",
            Self::AchHypothesis => "ach_hypothesis",
            Self::AchEvidence => "ach_evidence",
            Self::ContentAnalysis => "content_analysis",
            Self::ClaimAdjustment => "claim_adjustment",
            Self::Library => "library",
            Self::Feedback => "feedback",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
