//! Actor repository.
//!
//! The deception profile is stored verbatim. Parsing happens in the risk
//! aggregator, which skips profiles it cannot read.

use chrono::Utc;

use rt_core::entities::Actor;
use rt_core::enums::{ActivityAction, ActorType, EntityType};
use rt_core::ids::PREFIX_ACTOR;

use crate::error::DatabaseError;
use crate::helpers::{SetClauses, get_opt_string, parse_datetime, parse_enum, require_text};
use crate::repos::activity::{ActivityRecord, to_detail};
use crate::service::ResearchService;
use crate::updates::actor::ActorUpdate;

const SELECT_COLS: &str = "id, workspace_id, name, actor_type, description, deception_profile, created_at, updated_at";

fn row_to_actor(row: &libsql::Row) -> Result<Actor, DatabaseError> {
    Ok(Actor {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        name: row.get(2)?,
        actor_type: parse_enum(&row.get::<String>(3)?)?,
        description: get_opt_string(row, 4)?,
        deception_profile: get_opt_string(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl ResearchService {
    pub async fn create_actor(
        &self,
        by: &str,
        workspace_id: &str,
        name: &str,
        actor_type: ActorType,
        description: Option<&str>,
        deception_profile: Option<&str>,
    ) -> Result<Actor, DatabaseError> {
        require_text("name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ACTOR).await?;

        self.db()
            .execute(
                "INSERT INTO actors (id, workspace_id, name, actor_type, description, deception_profile, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    workspace_id,
                    name,
                    actor_type.as_str(),
                    description,
                    deception_profile,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Actor,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: None,
        })
        .await?;

        Ok(Actor {
            id,
            workspace_id: workspace_id.to_string(),
            name: name.to_string(),
            actor_type,
            description: description.map(String::from),
            deception_profile: deception_profile.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_actor(&self, id: &str) -> Result<Actor, DatabaseError> {
        let mut rows = self
            .db()
            .query(&format!("SELECT {SELECT_COLS} FROM actors WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_actor(&row)
    }

    pub async fn list_actors(
        &self,
        workspace_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Actor>, DatabaseError> {
        let limit_clause = limit.map_or_else(String::new, |n| format!(" LIMIT {n}"));
        let sql = format!(
            "SELECT {SELECT_COLS} FROM actors WHERE workspace_id = ?1 ORDER BY name, id{limit_clause}"
        );
        let mut rows = self.db().query(&sql, [workspace_id]).await?;
        let mut actors = Vec::new();
        while let Some(row) = rows.next().await? {
            actors.push(row_to_actor(&row)?);
        }
        Ok(actors)
    }

    pub async fn update_actor(
        &self,
        by: &str,
        id: &str,
        update: ActorUpdate,
    ) -> Result<Actor, DatabaseError> {
        let mut sets = SetClauses::new();
        if let Some(ref name) = update.name {
            require_text("name", name)?;
            sets.push_text("name", name);
        }
        if let Some(actor_type) = update.actor_type {
            sets.push_text("actor_type", actor_type.as_str());
        }
        if let Some(ref description) = update.description {
            sets.push_nullable("description", description.as_deref());
        }
        if let Some(ref profile) = update.deception_profile {
            sets.push_nullable("deception_profile", profile.as_deref());
        }
        if sets.is_empty() {
            return self.get_actor(id).await;
        }

        sets.push_text("updated_at", &Utc::now().to_rfc3339());
        let (sql, params) = sets.into_update("actors", "id", id);
        let changed = self
            .db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        let updated = self.get_actor(id).await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&updated.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Actor,
            entity_id: id,
            action: ActivityAction::Updated,
            detail: Some(to_detail(&update)?),
        })
        .await?;
        Ok(updated)
    }

    pub async fn delete_actor(&self, by: &str, id: &str) -> Result<(), DatabaseError> {
        let actor = self.get_actor(id).await?;
        self.db()
            .execute("DELETE FROM actors WHERE id = ?1", [id])
            .await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&actor.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::Actor,
            entity_id: id,
            action: ActivityAction::Deleted,
            detail: Some(serde_json::json!({ "name": actor.name })),
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_service, test_workspace};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn create_and_get_preserves_profile_text() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let raw = r#"{"mom": {"motive": 4, "opportunity": 3, "means": 2}}"#;

        let actor = svc
            .create_actor(&owner, &ws, "Unit 26165", ActorType::Unit, None, Some(raw))
            .await
            .unwrap();
        assert!(actor.id.starts_with("act-"));

        let fetched = svc.get_actor(&actor.id).await.unwrap();
        assert_eq!(fetched.deception_profile.as_deref(), Some(raw));
        assert_eq!(fetched.actor_type, ActorType::Unit);
    }

    #[tokio::test]
    async fn malformed_profile_is_still_stored() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let actor = svc
            .create_actor(&owner, &ws, "Broken", ActorType::Other, None, Some("{not json"))
            .await
            .unwrap();
        let fetched = svc.get_actor(&actor.id).await.unwrap();
        assert_eq!(fetched.deception_profile.as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn list_is_scoped_to_workspace() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let (other_owner, other_ws) = test_workspace(&svc).await;
        svc.create_actor(&owner, &ws, "B", ActorType::Person, None, None).await.unwrap();
        svc.create_actor(&owner, &ws, "A", ActorType::Person, None, None).await.unwrap();
        svc.create_actor(&other_owner, &other_ws, "C", ActorType::Person, None, None)
            .await
            .unwrap();

        let names: Vec<_> = svc
            .list_actors(&ws, None)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(svc.list_actors(&ws, Some(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_clears_nullable_field() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let actor = svc
            .create_actor(&owner, &ws, "X", ActorType::Group, Some("desc"), None)
            .await
            .unwrap();

        let updated = svc
            .update_actor(
                &owner,
                &actor.id,
                ActorUpdate {
                    description: Some(None),
                    actor_type: Some(ActorType::Organization),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description, None);
        assert_eq!(updated.actor_type, ActorType::Organization);
        assert_eq!(updated.name, "X");
    }

    #[tokio::test]
    async fn unknown_workspace_violates_constraint() {
        let svc = test_service().await;
        let (owner, _ws) = test_workspace(&svc).await;
        let err = svc
            .create_actor(&owner, "ws-missing", "X", ActorType::Other, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Constraint(_)));
    }

    #[tokio::test]
    async fn delete_removes_actor() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let actor = svc
            .create_actor(&owner, &ws, "Gone", ActorType::Person, None, None)
            .await
            .unwrap();
        svc.delete_actor(&owner, &actor.id).await.unwrap();
        assert!(matches!(svc.get_actor(&actor.id).await, Err(DatabaseError::NoResult)));
        assert!(matches!(
            svc.delete_actor(&owner, &actor.id).await,
            Err(DatabaseError::NoResult)
        ));
    }
}
