//! Row-to-entity parsing helpers.
//!
//! Every repo needs to convert `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`).

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse an optional TEXT column as `Option<DateTime<Utc>>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string cannot be parsed.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_datetime(s)?)),
        _ => Ok(None),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all rt-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read an INTEGER column holding `0`/`1` as a bool.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

/// Read a non-negative INTEGER column as `u64`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for negative values.
pub fn get_u64(row: &libsql::Row, idx: i32) -> Result<u64, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u64::try_from(raw).map_err(|_| DatabaseError::Query(format!("negative count {raw} in column {idx}")))
}

/// Read a non-negative INTEGER column as `u32`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for values outside `u32`.
pub fn get_u32(row: &libsql::Row, idx: i32) -> Result<u32, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u32::try_from(raw).map_err(|_| DatabaseError::Query(format!("value {raw} in column {idx} is not a u32")))
}

/// Read a nullable small INTEGER column as `Option<u8>`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for values outside `u8`.
pub fn get_opt_u8(row: &libsql::Row, idx: i32) -> Result<Option<u8>, DatabaseError> {
    row.get::<Option<i64>>(idx)?
        .map(|raw| {
            u8::try_from(raw)
                .map_err(|_| DatabaseError::Query(format!("value {raw} in column {idx} is not a u8")))
        })
        .transpose()
}

/// Parse a required JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column holds invalid JSON.
pub fn parse_json(s: &str) -> Result<serde_json::Value, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::Query(format!("Invalid JSON in column: {e}")))
}

/// Extract an optional JSON value from a TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string contains invalid JSON.
pub fn parse_optional_json(s: Option<&str>) -> Result<Option<serde_json::Value>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => Ok(Some(parse_json(s)?)),
        _ => Ok(None),
    }
}

/// Convert an optional string into a TEXT-or-NULL parameter.
#[must_use]
pub fn text_or_null(value: Option<&str>) -> libsql::Value {
    value.map_or(libsql::Value::Null, |s| libsql::Value::Text(s.to_string()))
}

/// Reject blank required text fields.
///
/// # Errors
///
/// Returns `DatabaseError::Validation` naming the field.
pub fn require_text(field: &str, value: &str) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(DatabaseError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Accumulates `column = ?n` clauses for a dynamic UPDATE.
///
/// Only fields that are `Some` in an update struct are pushed, so an update
/// with nothing set touches `updated_at` alone.
#[derive(Debug, Default)]
pub struct SetClauses {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl SetClauses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: &str, value: libsql::Value) {
        self.params.push(value);
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    pub fn push_text(&mut self, column: &str, value: &str) {
        self.push(column, libsql::Value::Text(value.to_string()));
    }

    /// Push a nullable column; `None` writes SQL NULL.
    pub fn push_nullable(&mut self, column: &str, value: Option<&str>) {
        self.push(column, text_or_null(value));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish as `UPDATE {table} SET ... WHERE {key} = ?n` with its params.
    #[must_use]
    pub fn into_update(self, table: &str, key: &str, id: &str) -> (String, Vec<libsql::Value>) {
        self.into_update_where(table, &[(key, id)])
    }

    /// Finish with every `(column, value)` pair ANDed into the WHERE clause.
    #[must_use]
    pub fn into_update_where(
        mut self,
        table: &str,
        keys: &[(&str, &str)],
    ) -> (String, Vec<libsql::Value>) {
        let mut conditions = Vec::with_capacity(keys.len());
        for (column, value) in keys {
            self.params.push(libsql::Value::Text((*value).to_string()));
            conditions.push(format!("{column} = ?{}", self.params.len()));
        }
        let sql = format!(
            "UPDATE {table} SET {} WHERE {}",
            self.sets.join(", "),
            conditions.join(" AND ")
        );
        (sql, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_datetime_formats() {
        let a = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let b = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_err());
        assert_eq!(parse_optional_datetime(Some("")).unwrap(), None);
    }

    #[test]
    fn parse_enum_uses_snake_case() {
        let status: rt_core::enums::AnalysisStatus = parse_enum("in_progress").unwrap();
        assert_eq!(status, rt_core::enums::AnalysisStatus::InProgress);
        assert!(parse_enum::<rt_core::enums::AnalysisStatus>("InProgress").is_err());
    }

    #[test]
    fn set_clauses_number_params_in_order() {
        let mut sets = SetClauses::new();
        sets.push_text("title", "New");
        sets.push_nullable("description", None);
        sets.push_text("updated_at", "2026-01-01T00:00:00+00:00");
        let (sql, params) = sets.into_update("actors", "id", "act-1");
        assert_eq!(
            sql,
            "UPDATE actors SET title = ?1, description = ?2, updated_at = ?3 WHERE id = ?4"
        );
        assert_eq!(params.len(), 4);
        assert!(matches!(params[1], libsql::Value::Null));
    }

    #[test]
    fn scoped_update_ands_keys() {
        let mut sets = SetClauses::new();
        sets.push_text("text", "New");
        let (sql, params) =
            sets.into_update_where("ach_evidence", &[("id", "evd-1"), ("analysis_id", "ach-1")]);
        assert_eq!(
            sql,
            "UPDATE ach_evidence SET text = ?1 WHERE id = ?2 AND analysis_id = ?3"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn require_text_rejects_blank() {
        assert!(require_text("name", "  ").is_err());
        assert!(require_text("name", "ok").is_ok());
    }
}
