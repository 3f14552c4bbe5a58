//! Framework session repository: CRUD, type filtering, status transitions.

use chrono::Utc;

use rt_core::entities::FrameworkSession;
use rt_core::enums::{ActivityAction, AnalysisStatus, EntityType, FrameworkType};
use rt_core::ids::PREFIX_FRAMEWORK;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClauses, get_opt_string, parse_datetime, parse_enum, parse_json, require_text,
};
use crate::repos::activity::{ActivityRecord, status_detail, to_detail};
use crate::service::ResearchService;
use crate::updates::framework::FrameworkSessionUpdate;

const SELECT_COLS: &str =
    "id, workspace_id, framework_type, title, description, data, status, created_at, updated_at";

fn row_to_session(row: &libsql::Row) -> Result<FrameworkSession, DatabaseError> {
    Ok(FrameworkSession {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        framework_type: parse_enum(&row.get::<String>(2)?)?,
        title: row.get(3)?,
        description: get_opt_string(row, 4)?,
        data: parse_json(&row.get::<String>(5)?)?,
        status: parse_enum(&row.get::<String>(6)?)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
        updated_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl ResearchService {
    /// Create a draft framework session. `data` is the framework's free-form
    /// JSON document.
    pub async fn create_framework_session(
        &self,
        by: &str,
        workspace_id: &str,
        framework_type: FrameworkType,
        title: &str,
        description: Option<&str>,
        data: serde_json::Value,
    ) -> Result<FrameworkSession, DatabaseError> {
        require_text("title", title)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_FRAMEWORK).await?;
        let status = AnalysisStatus::Draft;

        self.db()
            .execute(
                "INSERT INTO framework_sessions (id, workspace_id, framework_type, title, description, data, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                libsql::params![
                    id.as_str(),
                    workspace_id,
                    framework_type.as_str(),
                    title,
                    description,
                    data.to_string(),
                    status.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Framework,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: Some(serde_json::json!({ "framework_type": framework_type.as_str() })),
        })
        .await?;

        Ok(FrameworkSession {
            id,
            workspace_id: workspace_id.to_string(),
            framework_type,
            title: title.to_string(),
            description: description.map(String::from),
            data,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_framework_session(&self, id: &str) -> Result<FrameworkSession, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {SELECT_COLS} FROM framework_sessions WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_session(&row)
    }

    pub async fn list_framework_sessions(
        &self,
        workspace_id: &str,
        framework_type: Option<FrameworkType>,
        limit: u32,
    ) -> Result<Vec<FrameworkSession>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![workspace_id.into()];
        let type_filter = match framework_type {
            Some(ft) => {
                params.push(ft.as_str().into());
                " AND framework_type = ?2"
            }
            None => "",
        };
        let sql = format!(
            "SELECT {SELECT_COLS} FROM framework_sessions
             WHERE workspace_id = ?1{type_filter}
             ORDER BY updated_at DESC LIMIT {limit}"
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next().await? {
            sessions.push(row_to_session(&row)?);
        }
        Ok(sessions)
    }

    pub async fn update_framework_session(
        &self,
        by: &str,
        id: &str,
        update: FrameworkSessionUpdate,
    ) -> Result<FrameworkSession, DatabaseError> {
        let mut sets = SetClauses::new();
        if let Some(ref title) = update.title {
            require_text("title", title)?;
            sets.push_text("title", title);
        }
        if let Some(ref description) = update.description {
            sets.push_nullable("description", description.as_deref());
        }
        if let Some(ref data) = update.data {
            sets.push_text("data", &data.to_string());
        }
        if sets.is_empty() {
            return self.get_framework_session(id).await;
        }

        sets.push_text("updated_at", &Utc::now().to_rfc3339());
        let (sql, params) = sets.into_update("framework_sessions", "id", id);
        let changed = self
            .db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        let updated = self.get_framework_session(id).await?;
        // The data document can be large; log which fields changed, not their values.
        let mut changed_fields = to_detail(&update)?;
        if let Some(obj) = changed_fields.as_object_mut() {
            if obj.contains_key("data") {
                obj.insert("data".into(), serde_json::Value::Bool(true));
            }
        }
        self.append_activity(ActivityRecord {
            workspace_id: Some(&updated.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Framework,
            entity_id: id,
            action: ActivityAction::Updated,
            detail: Some(changed_fields),
        })
        .await?;
        Ok(updated)
    }

    pub async fn delete_framework_session(&self, by: &str, id: &str) -> Result<(), DatabaseError> {
        let session = self.get_framework_session(id).await?;
        self.db()
            .execute("DELETE FROM framework_sessions WHERE id = ?1", [id])
            .await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&session.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Framework,
            entity_id: id,
            action: ActivityAction::Deleted,
            detail: None,
        })
        .await?;
        Ok(())
    }

    /// Move a session through the status lifecycle.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a transition the lifecycle
    /// does not allow.
    pub async fn transition_framework_session(
        &self,
        by: &str,
        id: &str,
        new_status: AnalysisStatus,
    ) -> Result<FrameworkSession, DatabaseError> {
        let current = self.get_framework_session(id).await?;
        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition framework session {id} from {} to {new_status}",
                current.status
            )));
        }

        let now = Utc::now();
        self.db()
            .execute(
                "UPDATE framework_sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![new_status.as_str(), now.to_rfc3339(), id],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&current.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Framework,
            entity_id: id,
            action: ActivityAction::StatusChanged,
            detail: Some(status_detail(current.status.as_str(), new_status.as_str())),
        })
        .await?;

        Ok(FrameworkSession {
            status: new_status,
            updated_at: now,
            ..current
        })
    }
}
