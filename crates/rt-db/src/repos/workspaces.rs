//! Workspace repository: CRUD plus membership management.

use chrono::Utc;

use rt_core::entities::{Workspace, WorkspaceMember};
use rt_core::enums::{ActivityAction, EntityType, MemberRole};
use rt_core::ids::PREFIX_WORKSPACE;

use crate::error::DatabaseError;
use crate::helpers::{SetClauses, get_bool, get_opt_string, parse_datetime, parse_enum, require_text};
use crate::repos::activity::{ActivityRecord, to_detail};
use crate::service::ResearchService;
use crate::updates::workspace::WorkspaceUpdate;

const SELECT_COLS: &str =
    "w.id, w.name, w.description, w.owner_hash, w.is_public, w.created_at, w.updated_at";

fn row_to_workspace(row: &libsql::Row) -> Result<Workspace, DatabaseError> {
    Ok(Workspace {
        id: row.get(0)?,
        name: row.get(1)?,
        description: get_opt_string(row, 2)?,
        owner_hash: row.get(3)?,
        is_public: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

fn row_to_member(row: &libsql::Row) -> Result<WorkspaceMember, DatabaseError> {
    Ok(WorkspaceMember {
        workspace_id: row.get(0)?,
        account_hash: row.get(1)?,
        role: parse_enum(&row.get::<String>(2)?)?,
        added_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl ResearchService {
    /// Create a workspace owned by `owner`, who becomes its first member.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name and
    /// `DatabaseError::Constraint` if the owner account does not exist.
    pub async fn create_workspace(
        &self,
        owner: &str,
        name: &str,
        description: Option<&str>,
        is_public: bool,
    ) -> Result<Workspace, DatabaseError> {
        require_text("name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_WORKSPACE).await?;

        self.db()
            .execute(
                "INSERT INTO workspaces (id, name, description, owner_hash, is_public, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    id.as_str(),
                    name,
                    description,
                    owner,
                    i64::from(is_public),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;
        self.db()
            .execute(
                "INSERT INTO workspace_members (workspace_id, account_hash, role, added_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), owner, MemberRole::Owner.as_str(), now.to_rfc3339()],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&id),
            account_hash: Some(owner),
            entity_type: EntityType::Workspace,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: None,
        })
        .await?;

        Ok(Workspace {
            id,
            name: name.to_string(),
            description: description.map(String::from),
            owner_hash: owner.to_string(),
            is_public,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_workspace(&self, id: &str) -> Result<Workspace, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {SELECT_COLS} FROM workspaces w WHERE w.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_workspace(&row)
    }

    /// Workspaces the account belongs to, most recently updated first.
    pub async fn list_workspaces_for(
        &self,
        account_hash: &str,
        limit: u32,
    ) -> Result<Vec<Workspace>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM workspaces w
             JOIN workspace_members m ON m.workspace_id = w.id
             WHERE m.account_hash = ?1
             ORDER BY w.updated_at DESC LIMIT {limit}"
        );
        let mut rows = self.db().query(&sql, [account_hash]).await?;
        let mut workspaces = Vec::new();
        while let Some(row) = rows.next().await? {
            workspaces.push(row_to_workspace(&row)?);
        }
        Ok(workspaces)
    }

    pub async fn update_workspace(
        &self,
        by: &str,
        id: &str,
        update: WorkspaceUpdate,
    ) -> Result<Workspace, DatabaseError> {
        let mut sets = SetClauses::new();
        if let Some(ref name) = update.name {
            require_text("name", name)?;
            sets.push_text("name", name);
        }
        if let Some(ref description) = update.description {
            sets.push_nullable("description", description.as_deref());
        }
        if let Some(is_public) = update.is_public {
            sets.push("is_public", libsql::Value::Integer(i64::from(is_public)));
        }
        if sets.is_empty() {
            return self.get_workspace(id).await;
        }

        sets.push_text("updated_at", &Utc::now().to_rfc3339());
        let (sql, params) = sets.into_update("workspaces", "id", id);
        let changed = self
            .db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        self.append_activity(ActivityRecord {
            workspace_id: Some(id),
            account_hash: Some(by),
            entity_type: EntityType::Workspace,
            entity_id: id,
            action: ActivityAction::Updated,
            detail: Some(to_detail(&update)?),
        })
        .await?;
        self.get_workspace(id).await
    }

    /// Delete a workspace and, through cascades, everything inside it.
    pub async fn delete_workspace(&self, by: &str, id: &str) -> Result<(), DatabaseError> {
        let changed = self
            .db()
            .execute("DELETE FROM workspaces WHERE id = ?1", [id])
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.append_activity(ActivityRecord {
            workspace_id: Some(id),
            account_hash: Some(by),
            entity_type: EntityType::Workspace,
            entity_id: id,
            action: ActivityAction::Deleted,
            detail: None,
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    /// Add a member or change an existing member's role.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::InvalidState` when granting `owner` or touching the
    ///   owner's own membership.
    /// - `DatabaseError::NoResult` for an unknown workspace or account.
    pub async fn add_workspace_member(
        &self,
        by: &str,
        workspace_id: &str,
        account_hash: &str,
        role: MemberRole,
    ) -> Result<WorkspaceMember, DatabaseError> {
        if role == MemberRole::Owner {
            return Err(DatabaseError::InvalidState(
                "a workspace has exactly one owner".into(),
            ));
        }
        let workspace = self.get_workspace(workspace_id).await?;
        if workspace.owner_hash == account_hash {
            return Err(DatabaseError::InvalidState(
                "the owner's role cannot be changed".into(),
            ));
        }
        if !self.account_exists(account_hash).await? {
            return Err(DatabaseError::NoResult);
        }

        let now = Utc::now();
        self.db()
            .execute(
                "INSERT INTO workspace_members (workspace_id, account_hash, role, added_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (workspace_id, account_hash) DO UPDATE SET role = excluded.role",
                libsql::params![workspace_id, account_hash, role.as_str(), now.to_rfc3339()],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Workspace,
            entity_id: workspace_id,
            action: ActivityAction::Updated,
            detail: Some(serde_json::json!({ "member": account_hash, "role": role.as_str() })),
        })
        .await?;

        let mut rows = self
            .db()
            .query(
                "SELECT workspace_id, account_hash, role, added_at FROM workspace_members
                 WHERE workspace_id = ?1 AND account_hash = ?2",
                [workspace_id, account_hash],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_member(&row)
    }

    pub async fn remove_workspace_member(
        &self,
        by: &str,
        workspace_id: &str,
        account_hash: &str,
    ) -> Result<(), DatabaseError> {
        let workspace = self.get_workspace(workspace_id).await?;
        if workspace.owner_hash == account_hash {
            return Err(DatabaseError::InvalidState(
                "the owner cannot be removed from their workspace".into(),
            ));
        }
        let changed = self
            .db()
            .execute(
                "DELETE FROM workspace_members WHERE workspace_id = ?1 AND account_hash = ?2",
                [workspace_id, account_hash],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Workspace,
            entity_id: workspace_id,
            action: ActivityAction::Updated,
            detail: Some(serde_json::json!({ "member_removed": account_hash })),
        })
        .await?;
        Ok(())
    }

    pub async fn list_workspace_members(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<WorkspaceMember>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT workspace_id, account_hash, role, added_at FROM workspace_members
                 WHERE workspace_id = ?1 ORDER BY added_at, account_hash",
                [workspace_id],
            )
            .await?;
        let mut members = Vec::new();
        while let Some(row) = rows.next().await? {
            members.push(row_to_member(&row)?);
        }
        Ok(members)
    }

    /// The account's role in the workspace, or `None` for non-members.
    pub async fn member_role(
        &self,
        workspace_id: &str,
        account_hash: &str,
    ) -> Result<Option<MemberRole>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT role FROM workspace_members WHERE workspace_id = ?1 AND account_hash = ?2",
                [workspace_id, account_hash],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(parse_enum(&row.get::<String>(0)?)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_account, test_service, test_workspace};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_makes_owner_a_member() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;

        let workspace = svc.get_workspace(&ws).await.unwrap();
        assert_eq!(workspace.owner_hash, owner);
        assert!(!workspace.is_public);
        assert_eq!(
            svc.member_role(&ws, &owner).await.unwrap(),
            Some(MemberRole::Owner)
        );
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let svc = test_service().await;
        let owner = test_account(&svc).await;
        let err = svc.create_workspace(&owner, " ", None, false).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn list_only_returns_member_workspaces() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let (_other_owner, _other_ws) = test_workspace(&svc).await;

        let listed = svc.list_workspaces_for(&owner, 10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, ws);
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        svc.update_workspace(
            &owner,
            &ws,
            WorkspaceUpdate {
                description: Some(Some("Notes".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = svc
            .update_workspace(
                &owner,
                &ws,
                WorkspaceUpdate {
                    is_public: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Test workspace");
        assert_eq!(updated.description.as_deref(), Some("Notes"));
        assert!(updated.is_public);
    }

    #[tokio::test]
    async fn update_missing_workspace_is_no_result() {
        let svc = test_service().await;
        let owner = test_account(&svc).await;
        let err = svc
            .update_workspace(
                &owner,
                "ws-missing",
                WorkspaceUpdate {
                    name: Some("x".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }

    #[tokio::test]
    async fn member_lifecycle() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let editor = test_account(&svc).await;

        let member = svc
            .add_workspace_member(&owner, &ws, &editor, MemberRole::Viewer)
            .await
            .unwrap();
        assert_eq!(member.role, MemberRole::Viewer);

        let promoted = svc
            .add_workspace_member(&owner, &ws, &editor, MemberRole::Editor)
            .await
            .unwrap();
        assert_eq!(promoted.role, MemberRole::Editor);
        assert_eq!(svc.list_workspace_members(&ws).await.unwrap().len(), 2);

        svc.remove_workspace_member(&owner, &ws, &editor).await.unwrap();
        assert_eq!(svc.member_role(&ws, &editor).await.unwrap(), None);
        assert!(matches!(
            svc.remove_workspace_member(&owner, &ws, &editor).await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn owner_membership_is_protected() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let other = test_account(&svc).await;

        assert!(matches!(
            svc.add_workspace_member(&owner, &ws, &other, MemberRole::Owner).await,
            Err(DatabaseError::InvalidState(_))
        ));
        assert!(matches!(
            svc.add_workspace_member(&owner, &ws, &owner, MemberRole::Viewer).await,
            Err(DatabaseError::InvalidState(_))
        ));
        assert!(matches!(
            svc.remove_workspace_member(&owner, &ws, &owner).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn adding_unknown_account_is_no_result() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let err = svc
            .add_workspace_member(&owner, &ws, "9999999999999999", MemberRole::Viewer)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }

    #[tokio::test]
    async fn delete_cascades_members() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        svc.delete_workspace(&owner, &ws).await.unwrap();

        assert!(matches!(svc.get_workspace(&ws).await, Err(DatabaseError::NoResult)));
        assert!(svc.list_workspace_members(&ws).await.unwrap().is_empty());
    }
}
