use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rt_core::entities::Actor;
use rt_core::enums::ActorType;
use rt_db::updates::actor::ActorUpdate;
use serde::Deserialize;

use super::ListParams;
use crate::access::{Access, authorize};
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateActor {
    pub name: String,
    #[serde(default)]
    pub actor_type: ActorType,
    #[serde(default)]
    pub description: Option<String>,
    /// MOM/POP profile JSON, stored as sent.
    #[serde(default)]
    pub deception_profile: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Actor>>, ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Read).await?;
    let limit = state.limit(params.limit);
    Ok(Json(state.service.list_actors(&workspace_id, Some(limit)).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Json(body): Json<CreateActor>,
) -> Result<(StatusCode, Json<Actor>), ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Write).await?;
    let actor = state
        .service
        .create_actor(
            ctx.hash(),
            &workspace_id,
            &body.name,
            body.actor_type,
            body.description.as_deref(),
            body.deception_profile.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(actor)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<Actor>, ApiError> {
    let actor = state.service.get_actor(&id).await?;
    authorize(&state, &ctx, &actor.workspace_id, Access::Read).await?;
    Ok(Json(actor))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(update): Json<ActorUpdate>,
) -> Result<Json<Actor>, ApiError> {
    let actor = state.service.get_actor(&id).await?;
    authorize(&state, &ctx, &actor.workspace_id, Access::Write).await?;
    Ok(Json(state.service.update_actor(ctx.hash(), &id, update).await?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let actor = state.service.get_actor(&id).await?;
    authorize(&state, &ctx, &actor.workspace_id, Access::Write).await?;
    state.service.delete_actor(ctx.hash(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
