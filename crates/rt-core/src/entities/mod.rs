//! Entity structs for all ResearchTools domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `rt-db/migrations`). All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation.

mod account;
mod ach;
mod activity;
mod actor;
mod content;
mod feedback;
mod framework;
mod library;
mod settings;
mod source;
mod workspace;

pub use account::Account;
pub use ach::{AchAnalysis, AchAnalysisSummary, Evidence, Hypothesis};
pub use activity::ActivityEntry;
pub use actor::Actor;
pub use content::{ClaimAdjustment, ContentAnalysis};
pub use feedback::Feedback;
pub use framework::FrameworkSession;
pub use library::LibraryFramework;
pub use settings::AccountSettings;
pub use source::Source;
pub use workspace::{Workspace, WorkspaceMember};
