//! Service layer hosting every repository method.
//!
//! `ResearchService` wraps `ResearchDb`. Repo modules under [`crate::repos`]
//! add methods through `impl ResearchService` blocks. Mutations follow one
//! protocol:
//! 1. Validate input and state
//! 2. Execute SQL
//! 3. Append an activity entry
//! 4. Return the stored entity

use crate::ResearchDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with the activity log.
pub struct ResearchService {
    db: ResearchDb,
}

impl ResearchService {
    /// Open a service over a local database file (`":memory:"` for tests).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = ResearchDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `ResearchDb`.
    #[must_use]
    pub const fn from_db(db: ResearchDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ResearchDb {
        &self.db
    }
}
