use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rt_core::entities::FrameworkSession;
use rt_core::enums::FrameworkType;
use rt_db::updates::framework::FrameworkSessionUpdate;
use serde::Deserialize;

use super::{FrameworkListParams, StatusChange};
use crate::access::{Access, authorize};
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateFramework {
    pub framework_type: FrameworkType,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Query(params): Query<FrameworkListParams>,
) -> Result<Json<Vec<FrameworkSession>>, ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Read).await?;
    let sessions = state
        .service
        .list_framework_sessions(
            &workspace_id,
            params.framework_type,
            state.limit(params.limit),
        )
        .await?;
    Ok(Json(sessions))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Json(body): Json<CreateFramework>,
) -> Result<(StatusCode, Json<FrameworkSession>), ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Write).await?;
    let session = state
        .service
        .create_framework_session(
            ctx.hash(),
            &workspace_id,
            body.framework_type,
            &body.title,
            body.description.as_deref(),
            body.data,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<FrameworkSession>, ApiError> {
    let session = state.service.get_framework_session(&id).await?;
    authorize(&state, &ctx, &session.workspace_id, Access::Read).await?;
    Ok(Json(session))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(update): Json<FrameworkSessionUpdate>,
) -> Result<Json<FrameworkSession>, ApiError> {
    let session = state.service.get_framework_session(&id).await?;
    authorize(&state, &ctx, &session.workspace_id, Access::Write).await?;
    Ok(Json(
        state
            .service
            .update_framework_session(ctx.hash(), &id, update)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let session = state.service.get_framework_session(&id).await?;
    authorize(&state, &ctx, &session.workspace_id, Access::Write).await?;
    state.service.delete_framework_session(ctx.hash(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn transition(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(body): Json<StatusChange>,
) -> Result<Json<FrameworkSession>, ApiError> {
    let session = state.service.get_framework_session(&id).await?;
    authorize(&state, &ctx, &session.workspace_id, Access::Write).await?;
    Ok(Json(
        state
            .service
            .transition_framework_session(ctx.hash(), &id, body.status)
            .await?,
    ))
}
