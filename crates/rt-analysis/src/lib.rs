//! # rt-analysis
//!
//! Pure scoring functions for ResearchTools. Nothing here touches the
//! database or the network; callers load rows and pass them in.
//!
//! - [`ach`]: per-hypothesis tallies, ranking, and the display matrix for an
//!   Analysis of Competing Hypotheses.
//! - [`templates`]: starter hypotheses and evidence categories for new
//!   ACH analyses.
//! - [`deception`]: weighted roll-up of MOM, POP, MOSES, EVE, and claim risk
//!   into a single 0-100 workspace score with ranked alerts.

pub mod ach;
pub mod deception;
pub mod templates;
