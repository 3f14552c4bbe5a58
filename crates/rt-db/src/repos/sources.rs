//! Source repository. MOSES assessments are kept as raw JSON text.

use chrono::Utc;

use rt_core::entities::Source;
use rt_core::enums::{ActivityAction, EntityType, SourceType};
use rt_core::ids::PREFIX_SOURCE;

use crate::error::DatabaseError;
use crate::helpers::{SetClauses, get_opt_string, parse_datetime, parse_enum, require_text};
use crate::repos::activity::{ActivityRecord, to_detail};
use crate::service::ResearchService;
use crate::updates::source::SourceUpdate;

const SELECT_COLS: &str = "id, workspace_id, name, source_type, description, moses_assessment, created_at, updated_at";

fn row_to_source(row: &libsql::Row) -> Result<Source, DatabaseError> {
    Ok(Source {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        name: row.get(2)?,
        source_type: parse_enum(&row.get::<String>(3)?)?,
        description: get_opt_string(row, 4)?,
        moses_assessment: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl ResearchService {
    pub async fn create_source(
        &self,
        by: &str,
        workspace_id: &str,
        name: &str,
        source_type: SourceType,
        description: Option<&str>,
        moses_assessment: Option<&str>,
    ) -> Result<Source, DatabaseError> {
        require_text("name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_SOURCE).await?;

        self.db()
            .execute(
                "INSERT INTO sources (id, workspace_id, name, source_type, description, moses_assessment, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    workspace_id,
                    name,
                    source_type.as_str(),
                    description,
                    moses_assessment,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Source,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: None,
        })
        .await?;

        Ok(Source {
            id,
            workspace_id: workspace_id.to_string(),
            name: name.to_string(),
            source_type,
            description: description.map(String::from),
            moses_assessment: moses_assessment.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_source(&self, id: &str) -> Result<Source, DatabaseError> {
        let mut rows = self
            .db()
            .query(&format!("SELECT {SELECT_COLS} FROM sources WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_source(&row)
    }

    /// Sources of a workspace ordered by name. `None` returns every row.
    pub async fn list_sources(
        &self,
        workspace_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Source>, DatabaseError> {
        let limit_clause = limit.map_or_else(String::new, |n| format!(" LIMIT {n}"));
        let sql = format!(
            "SELECT {SELECT_COLS} FROM sources WHERE workspace_id = ?1 ORDER BY name, id{limit_clause}"
        );
        let mut rows = self.db().query(&sql, [workspace_id]).await?;
        let mut sources = Vec::new();
        while let Some(row) = rows.next().await? {
            sources.push(row_to_source(&row)?);
        }
        Ok(sources)
    }

    pub async fn update_source(
        &self,
        by: &str,
        id: &str,
        update: SourceUpdate,
    ) -> Result<Source, DatabaseError> {
        let mut sets = SetClauses::new();
        if let Some(ref name) = update.name {
            require_text("name", name)?;
            sets.push_text("name", name);
        }
        if let Some(source_type) = update.source_type {
            sets.push_text("source_type", source_type.as_str());
        }
        if let Some(ref description) = update.description {
            sets.push_nullable("description", description.as_deref());
        }
        if let Some(ref assessment) = update.moses_assessment {
            sets.push_nullable("moses_assessment", assessment.as_deref());
        }
        if sets.is_empty() {
            return self.get_source(id).await;
        }

        sets.push_text("updated_at", &Utc::now().to_rfc3339());
        let (sql, params) = sets.into_update("sources", "id", id);
        let changed = self
            .db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        let updated = self.get_source(id).await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&updated.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Source,
            entity_id: id,
            action: ActivityAction::Updated,
            detail: Some(to_detail(&update)?),
        })
        .await?;
        Ok(updated)
    }

    pub async fn delete_source(&self, by: &str, id: &str) -> Result<(), DatabaseError> {
        let source = self.get_source(id).await?;
        self.db()
            .execute("DELETE FROM sources WHERE id = ?1", [id])
            .await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&source.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Source,
            entity_id: id,
            action: ActivityAction::Deleted,
            detail: Some(serde_json::json!({ "name": source.name })),
        })
        .await?;
        Ok(())
    }
}
