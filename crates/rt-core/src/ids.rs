//! ID prefix constants.
//!
//! IDs are generated by the database as `{prefix}-{8 hex chars}`
//! (see `ResearchDb::generate_id`). Accounts are the exception: they are
//! keyed by their 16-digit account hash.

pub const PREFIX_WORKSPACE: &str = "ws";
pub const PREFIX_ACTOR: &str = "act";
pub const PREFIX_SOURCE: &str = "src";
pub const PREFIX_FRAMEWORK: &str = "fw";
pub const PREFIX_ACH: &str = "ach";
pub const PREFIX_HYPOTHESIS: &str = "hyp";
pub const PREFIX_EVIDENCE: &str = "evd";
pub const PREFIX_CONTENT: &str = "cia";
pub const PREFIX_ADJUSTMENT: &str = "adj";
pub const PREFIX_LIBRARY: &str = "lib";
pub const PREFIX_FEEDBACK: &str = "fbk";
pub const PREFIX_ACTIVITY: &str = "log";

/// All entity prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_WORKSPACE,
    PREFIX_ACTOR,
    PREFIX_SOURCE,
    PREFIX_FRAMEWORK,
    PREFIX_ACH,
    PREFIX_HYPOTHESIS,
    PREFIX_EVIDENCE,
    PREFIX_CONTENT,
    PREFIX_ADJUSTMENT,
    PREFIX_LIBRARY,
    PREFIX_FEEDBACK,
    PREFIX_ACTIVITY,
];
