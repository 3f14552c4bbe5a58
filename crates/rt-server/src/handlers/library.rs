//! Public framework library. Browsing needs no account; publishing and
//! forking need write access to the workspace involved.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rt_core::entities::{FrameworkSession, LibraryFramework};
use serde::Deserialize;

use super::FrameworkListParams;
use crate::access::{Access, authorize};
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub framework_session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForkRequest {
    pub workspace_id: String,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FrameworkListParams>,
) -> Result<Json<Vec<LibraryFramework>>, ApiError> {
    let entries = state
        .service
        .list_library_frameworks(params.framework_type, state.limit(params.limit))
        .await?;
    Ok(Json(entries))
}

pub async fn publish(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Json(body): Json<PublishRequest>,
) -> Result<(StatusCode, Json<LibraryFramework>), ApiError> {
    let session = state
        .service
        .get_framework_session(&body.framework_session_id)
        .await?;
    authorize(&state, &ctx, &session.workspace_id, Access::Write).await?;
    let entry = state
        .service
        .publish_framework(
            ctx.hash(),
            &session.id,
            body.title.as_deref(),
            body.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<LibraryFramework>, ApiError> {
    Ok(Json(state.service.get_library_framework(&id).await?))
}

pub async fn fork(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(body): Json<ForkRequest>,
) -> Result<(StatusCode, Json<FrameworkSession>), ApiError> {
    authorize(&state, &ctx, &body.workspace_id, Access::Write).await?;
    let session = state
        .service
        .fork_library_framework(ctx.hash(), &id, &body.workspace_id)
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}
