//! # rt-db
//!
//! libSQL persistence for ResearchTools.
//!
//! Holds accounts, workspaces and their members, actors, sources, framework
//! sessions, ACH analyses, content analyses with claim adjustments, the public
//! framework library, feedback, settings, and the activity log.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) against a local file or
//! an in-memory database. [`service::ResearchService`] hosts every repository
//! method; [`ResearchDb`] is the thin connection wrapper underneath it.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;
use libsql::params::IntoParams;

/// Database handle for all ResearchTools state.
///
/// Wraps a libSQL database and a single connection. The connection is
/// cheap to share behind an `Arc`; libSQL serializes statements internally.
pub struct ResearchDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ResearchDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let research_db = Self { db, conn };
        research_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(research_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Execute a statement, returning the number of affected rows.
    ///
    /// # Errors
    ///
    /// Constraint failures surface as [`DatabaseError::Constraint`]; other
    /// failures as [`DatabaseError::LibSql`].
    pub async fn execute(&self, sql: &str, params: impl IntoParams) -> Result<u64, DatabaseError> {
        self.conn
            .execute(sql, params)
            .await
            .map_err(DatabaseError::from_libsql)
    }

    /// Run a query and return its rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the statement fails to prepare or run.
    pub async fn query(
        &self,
        sql: &str,
        params: impl IntoParams,
    ) -> Result<libsql::Rows, DatabaseError> {
        self.conn
            .query(sql, params)
            .await
            .map_err(DatabaseError::from_libsql)
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"act-a3f8b2c1"`.
    ///
    /// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}
