use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ActorType;

/// A person, organization, or group under analysis.
///
/// `deception_profile` is stored verbatim as JSON text. It is parsed only
/// during risk aggregation, where a malformed profile is skipped.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub actor_type: ActorType,
    pub description: Option<String>,
    pub deception_profile: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
