//! Route handlers, one module per resource.

pub mod ach;
pub mod actors;
pub mod auth;
pub mod content;
pub mod feedback;
pub mod frameworks;
pub mod health;
pub mod library;
pub mod settings;
pub mod sources;
pub mod workspaces;

use rt_core::enums::{AnalysisStatus, FrameworkType};
use serde::Deserialize;

/// `?limit=` on list endpoints; clamped to `general.max_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

/// `?framework_type=&limit=` on framework and library listings.
#[derive(Debug, Default, Deserialize)]
pub struct FrameworkListParams {
    pub framework_type: Option<FrameworkType>,
    pub limit: Option<u32>,
}

/// Body of the `/status` endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: AnalysisStatus,
}
