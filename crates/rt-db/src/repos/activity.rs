//! Activity log repository.
//!
//! Append-only entries recording every mutation, with dynamic filtering for
//! the workspace history views.

use chrono::Utc;
use serde::Serialize;

use rt_core::entities::ActivityEntry;
use rt_core::enums::{ActivityAction, EntityType};
use rt_core::ids::PREFIX_ACTIVITY;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::ResearchService;

const SELECT_COLS: &str =
    "id, workspace_id, account_hash, entity_type, entity_id, action, detail, created_at";

const DEFAULT_ACTIVITY_LIMIT: u32 = 100;

/// A mutation about to be logged.
#[derive(Debug, Clone)]
pub struct ActivityRecord<'a> {
    pub workspace_id: Option<&'a str>,
    pub account_hash: Option<&'a str>,
    pub entity_type: EntityType,
    pub entity_id: &'a str,
    pub action: ActivityAction,
    pub detail: Option<serde_json::Value>,
}

/// Filter criteria for activity queries.
#[derive(Debug, Default)]
pub struct ActivityFilter {
    pub workspace_id: Option<String>,
    pub account_hash: Option<String>,
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<ActivityAction>,
    pub limit: Option<u32>,
}

/// Serialize an update or detail struct for the `detail` column.
pub(crate) fn to_detail<T: Serialize>(value: &T) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(value).map_err(|e| DatabaseError::Other(e.into()))
}

/// Detail payload for status transitions.
pub(crate) fn status_detail(from: &str, to: &str) -> serde_json::Value {
    serde_json::json!({ "from": from, "to": to })
}

fn row_to_activity(row: &libsql::Row) -> Result<ActivityEntry, DatabaseError> {
    Ok(ActivityEntry {
        id: row.get(0)?,
        workspace_id: get_opt_string(row, 1)?,
        account_hash: get_opt_string(row, 2)?,
        entity_type: parse_enum(&row.get::<String>(3)?)?,
        entity_id: row.get(4)?,
        action: parse_enum(&row.get::<String>(5)?)?,
        detail: parse_optional_json(get_opt_string(row, 6)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl ResearchService {
    /// Append an activity entry. Called by every mutation method.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_activity(
        &self,
        record: ActivityRecord<'_>,
    ) -> Result<ActivityEntry, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ACTIVITY).await?;
        let detail_text = record.detail.as_ref().map(ToString::to_string);

        self.db()
            .execute(
                "INSERT INTO activity_log (id, workspace_id, account_hash, entity_type, entity_id, action, detail, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    record.workspace_id,
                    record.account_hash,
                    record.entity_type.as_str(),
                    record.entity_id,
                    record.action.as_str(),
                    detail_text.as_deref(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(ActivityEntry {
            id,
            workspace_id: record.workspace_id.map(String::from),
            account_hash: record.account_hash.map(String::from),
            entity_type: record.entity_type,
            entity_id: record.entity_id.to_string(),
            action: record.action,
            detail: record.detail,
            created_at: now,
        })
    }

    /// Query activity entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_activity(
        &self,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref ws) = filter.workspace_id {
            params.push(libsql::Value::Text(ws.clone()));
            conditions.push(format!("workspace_id = ?{}", params.len()));
        }
        if let Some(ref hash) = filter.account_hash {
            params.push(libsql::Value::Text(hash.clone()));
            conditions.push(format!("account_hash = ?{}", params.len()));
        }
        if let Some(et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = filter.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM activity_log {where_clause} ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_activity(&row)?);
        }
        Ok(entries)
    }
}
