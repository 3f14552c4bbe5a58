//! Public framework library: publish snapshots, browse, and fork.
//!
//! A library entry is a copy of a framework session at publish time. Later
//! edits to the session do not reach the library, and forks start from the
//! snapshot.

use chrono::Utc;

use rt_core::entities::{FrameworkSession, LibraryFramework};
use rt_core::enums::{ActivityAction, EntityType, FrameworkType};
use rt_core::ids::PREFIX_LIBRARY;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_u64, parse_datetime, parse_enum, parse_json};
use crate::repos::activity::ActivityRecord;
use crate::service::ResearchService;

const SELECT_COLS: &str = "id, framework_session_id, framework_type, title, description, data, author_hash, view_count, fork_count, created_at, updated_at";

fn row_to_library(row: &libsql::Row) -> Result<LibraryFramework, DatabaseError> {
    Ok(LibraryFramework {
        id: row.get(0)?,
        framework_session_id: get_opt_string(row, 1)?,
        framework_type: parse_enum(&row.get::<String>(2)?)?,
        title: row.get(3)?,
        description: get_opt_string(row, 4)?,
        data: parse_json(&row.get::<String>(5)?)?,
        author_hash: row.get(6)?,
        view_count: get_u64(row, 7)?,
        fork_count: get_u64(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl ResearchService {
    /// Publish a snapshot of a framework session. Title and description
    /// default to the session's own.
    pub async fn publish_framework(
        &self,
        by: &str,
        session_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<LibraryFramework, DatabaseError> {
        let session = self.get_framework_session(session_id).await?;
        let title = title.filter(|t| !t.trim().is_empty()).unwrap_or(&session.title);
        let description = description.or(session.description.as_deref());
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_LIBRARY).await?;

        self.db()
            .execute(
                "INSERT INTO library_frameworks (id, framework_session_id, framework_type, title, description, data, author_hash, view_count, fork_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, ?8, ?9)",
                libsql::params![
                    id.as_str(),
                    session_id,
                    session.framework_type.as_str(),
                    title,
                    description,
                    session.data.to_string(),
                    by,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&session.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Library,
            entity_id: &id,
            action: ActivityAction::Published,
            detail: Some(serde_json::json!({ "framework_session_id": session_id })),
        })
        .await?;

        Ok(LibraryFramework {
            id,
            framework_session_id: Some(session_id.to_string()),
            framework_type: session.framework_type,
            title: title.to_string(),
            description: description.map(String::from),
            data: session.data,
            author_hash: by.to_string(),
            view_count: 0,
            fork_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    async fn fetch_library_framework(&self, id: &str) -> Result<LibraryFramework, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {SELECT_COLS} FROM library_frameworks WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_library(&row)
    }

    /// Fetch a library entry, counting the view.
    pub async fn get_library_framework(&self, id: &str) -> Result<LibraryFramework, DatabaseError> {
        let changed = self
            .db()
            .execute(
                "UPDATE library_frameworks SET view_count = view_count + 1 WHERE id = ?1",
                [id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.fetch_library_framework(id).await
    }

    /// Browse the library, most forked first.
    pub async fn list_library_frameworks(
        &self,
        framework_type: Option<FrameworkType>,
        limit: u32,
    ) -> Result<Vec<LibraryFramework>, DatabaseError> {
        let mut params: Vec<libsql::Value> = Vec::new();
        let type_filter = match framework_type {
            Some(ft) => {
                params.push(ft.as_str().into());
                "WHERE framework_type = ?1"
            }
            None => "",
        };
        let sql = format!(
            "SELECT {SELECT_COLS} FROM library_frameworks {type_filter}
             ORDER BY fork_count DESC, view_count DESC, created_at DESC LIMIT {limit}"
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_library(&row)?);
        }
        Ok(entries)
    }

    /// Copy a library entry into `workspace_id` as a new draft session.
    pub async fn fork_library_framework(
        &self,
        by: &str,
        library_id: &str,
        workspace_id: &str,
    ) -> Result<FrameworkSession, DatabaseError> {
        let entry = self.fetch_library_framework(library_id).await?;
        let session = self
            .create_framework_session(
                by,
                workspace_id,
                entry.framework_type,
                &entry.title,
                entry.description.as_deref(),
                entry.data,
            )
            .await?;

        self.db()
            .execute(
                "UPDATE library_frameworks SET fork_count = fork_count + 1 WHERE id = ?1",
                [library_id],
            )
            .await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Library,
            entity_id: library_id,
            action: ActivityAction::Forked,
            detail: Some(serde_json::json!({ "framework_session_id": session.id })),
        })
        .await?;
        Ok(session)
    }
}
