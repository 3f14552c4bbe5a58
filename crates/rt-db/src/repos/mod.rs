//! Repository modules implementing the persistence operations for every
//! ResearchTools entity.
//!
//! Each module adds methods to `ResearchService` via `impl ResearchService`
//! blocks. Mutating methods take the acting account hash first.

pub mod accounts;
pub mod ach;
pub mod activity;
pub mod actors;
pub mod cleanup;
pub mod content;
pub mod deception;
pub mod feedback;
pub mod frameworks;
pub mod library;
pub mod settings;
pub mod sources;
pub mod workspaces;
