//! Response bodies shared by the HTTP API and the `rtools` CLI.
//!
//! Entity responses are returned as the entity structs themselves; the types
//! here cover the endpoints whose payload is not a single entity.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Account, ContentAnalysis};

/// Response from `POST /api/auth/register` and `rtools account register`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RegisterResponse {
    pub account_hash: String,
    pub warning: String,
}

impl RegisterResponse {
    pub const WARNING: &'static str = "Save this account hash securely. It is your only credential and cannot be recovered.";

    #[must_use]
    pub fn new(account_hash: String) -> Self {
        Self {
            account_hash,
            warning: Self::WARNING.to_string(),
        }
    }
}

/// Response from `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LoginResponse {
    pub account: Account,
    /// `true` when the hash was unknown and a new account was created.
    pub created: bool,
}

/// Response from `GET /api/auth/validate/{hash}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidateResponse {
    pub valid: bool,
    pub exists: bool,
}

/// Response from `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub llm_configured: bool,
}

/// Response from `POST /api/workspaces/{id}/content`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ContentPipelineResponse {
    pub analysis: ContentAnalysis,
    pub actors_created: u32,
    pub actors_failed: u32,
}

/// Response from `rtools cleanup` and the scheduled cleanup task.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CleanupResponse {
    pub deleted: u64,
    pub retention_days: u32,
}
