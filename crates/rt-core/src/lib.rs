//! # rt-core
//!
//! Core types, ID prefixes, and error types for ResearchTools.
//!
//! This crate provides the foundational types shared across all crates:
//! - Entity structs for all domain objects (workspaces, actors, sources,
//!   ACH analyses, framework sessions, content analyses, library entries)
//! - Status enums with state machine transitions
//! - ID prefix constants
//! - Cross-cutting error types
//! - Request-scoped account identity
//! - API response types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod responses;
