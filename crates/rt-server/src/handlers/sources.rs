use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rt_core::entities::Source;
use rt_core::enums::SourceType;
use rt_db::updates::source::SourceUpdate;
use serde::Deserialize;

use super::ListParams;
use crate::access::{Access, authorize};
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSource {
    pub name: String,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub description: Option<String>,
    /// MOSES assessment JSON, stored as sent.
    #[serde(default)]
    pub moses_assessment: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Source>>, ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Read).await?;
    let limit = state.limit(params.limit);
    Ok(Json(state.service.list_sources(&workspace_id, Some(limit)).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Json(body): Json<CreateSource>,
) -> Result<(StatusCode, Json<Source>), ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Write).await?;
    let source = state
        .service
        .create_source(
            ctx.hash(),
            &workspace_id,
            &body.name,
            body.source_type,
            body.description.as_deref(),
            body.moses_assessment.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(source)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<Source>, ApiError> {
    let source = state.service.get_source(&id).await?;
    authorize(&state, &ctx, &source.workspace_id, Access::Read).await?;
    Ok(Json(source))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(update): Json<SourceUpdate>,
) -> Result<Json<Source>, ApiError> {
    let source = state.service.get_source(&id).await?;
    authorize(&state, &ctx, &source.workspace_id, Access::Write).await?;
    Ok(Json(state.service.update_source(ctx.hash(), &id, update).await?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let source = state.service.get_source(&id).await?;
    authorize(&state, &ctx, &source.workspace_id, Access::Write).await?;
    state.service.delete_source(ctx.hash(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
