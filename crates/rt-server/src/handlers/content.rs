//! Content intelligence pipeline and claim adjustments.
//!
//! `POST /api/workspaces/{id}/content` sends the text to the LLM, stores the
//! summary, entities and claim analysis, then saves every extracted person
//! and organization as an actor. One failed actor save is logged and
//! counted; it never fails the request.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rt_core::entities::{ClaimAdjustment, ContentAnalysis};
use rt_core::enums::ActorType;
use rt_core::responses::ContentPipelineResponse;
use rt_db::repos::content::NewContentAnalysis;
use rt_llm::prompts::content_intelligence_prompt;
use rt_llm::reply::{ContentIntelligenceReply, ExtractedEntities, decode};
use serde::Deserialize;

use super::ListParams;
use crate::access::{Access, authorize};
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeContent {
    pub content_text: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustClaim {
    pub adjusted_risk_score: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Actors created and failed by [`save_entities`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BatchOutcome {
    created: u32,
    failed: u32,
}

async fn save_entities(
    state: &AppState,
    by: &str,
    workspace_id: &str,
    analysis_id: &str,
    entities: &ExtractedEntities,
) -> BatchOutcome {
    let description = format!("Extracted from content analysis {analysis_id}");
    let candidates = entities
        .people
        .iter()
        .map(|name| (name, ActorType::Person))
        .chain(
            entities
                .organizations
                .iter()
                .map(|name| (name, ActorType::Organization)),
        );

    let mut outcome = BatchOutcome::default();
    for (name, actor_type) in candidates {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match state
            .service
            .create_actor(by, workspace_id, name, actor_type, Some(&description), None)
            .await
        {
            Ok(_) => outcome.created += 1,
            Err(err) => {
                tracing::warn!(%workspace_id, actor = name, error = %err, "skipping extracted actor");
                outcome.failed += 1;
            }
        }
    }
    outcome
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ContentAnalysis>>, ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Read).await?;
    let limit = state.limit(params.limit);
    Ok(Json(
        state
            .service
            .list_content_analyses(&workspace_id, Some(limit))
            .await?,
    ))
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Json(body): Json<AnalyzeContent>,
) -> Result<(StatusCode, Json<ContentPipelineResponse>), ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Write).await?;
    if body.content_text.trim().is_empty() {
        return Err(ApiError::validation("content_text must not be empty"));
    }

    let llm = state.llm()?;
    let request = content_intelligence_prompt(&body.content_text, body.url.as_deref());
    let reply: ContentIntelligenceReply = decode(llm.complete_json(request).await?)?;

    let entities = serde_json::to_value(&reply.entities)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let claim_analysis = reply.claim_analysis_document().to_string();
    let summary = Some(reply.summary.as_str()).filter(|s| !s.trim().is_empty());
    let analysis = state
        .service
        .create_content_analysis(
            ctx.hash(),
            &workspace_id,
            &NewContentAnalysis {
                url: body.url.as_deref(),
                title: body.title.as_deref(),
                content_text: &body.content_text,
                summary,
                entities,
                claim_analysis: Some(&claim_analysis),
            },
        )
        .await?;

    let outcome = save_entities(
        &state,
        ctx.hash(),
        &workspace_id,
        &analysis.id,
        &reply.entities,
    )
    .await;
    tracing::info!(
        id = %analysis.id,
        claims = reply.claims.len(),
        actors_created = outcome.created,
        actors_failed = outcome.failed,
        "content analyzed"
    );

    Ok((
        StatusCode::CREATED,
        Json(ContentPipelineResponse {
            analysis,
            actors_created: outcome.created,
            actors_failed: outcome.failed,
        }),
    ))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<ContentAnalysis>, ApiError> {
    let content = state.service.get_content_analysis(&id).await?;
    authorize(&state, &ctx, &content.workspace_id, Access::Read).await?;
    Ok(Json(content))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let content = state.service.get_content_analysis(&id).await?;
    authorize(&state, &ctx, &content.workspace_id, Access::Write).await?;
    state.service.delete_content_analysis(ctx.hash(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark an analysis as saved so the retention cleanup keeps it.
pub async fn save(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<ContentAnalysis>, ApiError> {
    let content = state.service.get_content_analysis(&id).await?;
    authorize(&state, &ctx, &content.workspace_id, Access::Write).await?;
    Ok(Json(state.service.save_content_analysis(ctx.hash(), &id).await?))
}

pub async fn adjust_claim(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path((id, index)): Path<(String, u32)>,
    Json(body): Json<AdjustClaim>,
) -> Result<Json<ClaimAdjustment>, ApiError> {
    let content = state.service.get_content_analysis(&id).await?;
    authorize(&state, &ctx, &content.workspace_id, Access::Write).await?;
    let adjustment = state
        .service
        .adjust_claim(
            ctx.hash(),
            &id,
            index,
            body.adjusted_risk_score,
            body.reason.as_deref(),
        )
        .await?;
    Ok(Json(adjustment))
}

pub async fn list_adjustments(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<Vec<ClaimAdjustment>>, ApiError> {
    let content = state.service.get_content_analysis(&id).await?;
    authorize(&state, &ctx, &content.workspace_id, Access::Read).await?;
    Ok(Json(state.service.list_claim_adjustments(&id).await?))
}
