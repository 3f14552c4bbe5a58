//! Database error types for rt-db.

use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or a stored value could not be decoded.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The operation is not allowed in the entity's current state
    /// (illegal status transition, removing the workspace owner, ...).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Caller-supplied input is unusable (out-of-range score, empty text, ...).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A UNIQUE, FOREIGN KEY, or CHECK constraint rejected the write.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Classify a raw libSQL error, pulling constraint failures out of the
    /// generic bucket.
    pub(crate) fn from_libsql(err: libsql::Error) -> Self {
        let message = err.to_string();
        if message.contains("constraint failed") {
            Self::Constraint(message)
        } else {
            Self::LibSql(err)
        }
    }
}
