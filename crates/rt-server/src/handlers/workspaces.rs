//! Workspaces, membership, activity history, and the deception risk report.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rt_analysis::deception::DeceptionRiskReport;
use rt_auth::validate_account_hash;
use rt_core::entities::{ActivityEntry, Workspace, WorkspaceMember};
use rt_core::enums::MemberRole;
use rt_db::repos::activity::ActivityFilter;
use rt_db::updates::workspace::WorkspaceUpdate;
use serde::Deserialize;

use super::ListParams;
use crate::access::{Access, authorize};
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspace {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddMember {
    pub account_hash: String,
    pub role: MemberRole,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Workspace>>, ApiError> {
    let limit = state.limit(params.limit);
    Ok(Json(state.service.list_workspaces_for(ctx.hash(), limit).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Json(body): Json<CreateWorkspace>,
) -> Result<(StatusCode, Json<Workspace>), ApiError> {
    let workspace = state
        .service
        .create_workspace(
            ctx.hash(),
            &body.name,
            body.description.as_deref(),
            body.is_public,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<Workspace>, ApiError> {
    Ok(Json(authorize(&state, &ctx, &id, Access::Read).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(update): Json<WorkspaceUpdate>,
) -> Result<Json<Workspace>, ApiError> {
    authorize(&state, &ctx, &id, Access::Write).await?;
    Ok(Json(state.service.update_workspace(ctx.hash(), &id, update).await?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &ctx, &id, Access::Owner).await?;
    state.service.delete_workspace(ctx.hash(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_members(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<Vec<WorkspaceMember>>, ApiError> {
    authorize(&state, &ctx, &id, Access::Read).await?;
    Ok(Json(state.service.list_workspace_members(&id).await?))
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(body): Json<AddMember>,
) -> Result<(StatusCode, Json<WorkspaceMember>), ApiError> {
    authorize(&state, &ctx, &id, Access::Owner).await?;
    validate_account_hash(&body.account_hash)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    let member = state
        .service
        .add_workspace_member(ctx.hash(), &id, &body.account_hash, body.role)
        .await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path((id, hash)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &ctx, &id, Access::Owner).await?;
    state
        .service
        .remove_workspace_member(ctx.hash(), &id, &hash)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn activity(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    authorize(&state, &ctx, &id, Access::Read).await?;
    let filter = ActivityFilter {
        workspace_id: Some(id),
        limit: Some(state.limit(params.limit)),
        ..ActivityFilter::default()
    };
    Ok(Json(state.service.list_activity(&filter).await?))
}

pub async fn deception_risk(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<DeceptionRiskReport>, ApiError> {
    authorize(&state, &ctx, &id, Access::Read).await?;
    Ok(Json(state.service.deception_risk(&id).await?))
}
