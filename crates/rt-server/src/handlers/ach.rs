//! ACH analyses: CRUD, matrix editing, scoring, and LLM suggestions.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rt_analysis::ach::{
    AchMatrix, HypothesisScore, build_matrix, rank_by_weighted_score, rank_hypotheses,
    score_matrix,
};
use rt_analysis::templates::{AchTemplate, ach_templates};
use rt_core::entities::{AchAnalysis, AchAnalysisSummary, Evidence, Hypothesis};
use rt_core::enums::{AchScaleType, AchScore};
use rt_db::updates::ach::{AchAnalysisUpdate, EvidenceUpdate};
use rt_llm::prompts::ach_suggestion_prompt;
use rt_llm::reply::{AchSuggestionReply, decode};
use serde::{Deserialize, Serialize};

use super::{ListParams, StatusChange};
use crate::access::{Access, authorize};
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateAnalysis {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub scale_type: AchScaleType,
}

#[derive(Debug, Deserialize)]
pub struct HypothesisText {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AddEvidence {
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    /// Must be on the analysis scale; omitted means `1`.
    #[serde(default)]
    pub weight: Option<u8>,
    #[serde(default)]
    pub scores: BTreeMap<String, AchScore>,
}

/// One matrix cell; `score: null` clears it.
#[derive(Debug, Deserialize)]
pub struct SetScore {
    pub evidence_id: String,
    pub hypothesis_id: String,
    #[serde(default)]
    pub score: Option<AchScore>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    pub key_question: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// Scored view of an analysis.
#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    pub analysis_id: String,
    /// Per-hypothesis tallies in analysis order.
    pub scores: Vec<HypothesisScore>,
    /// The same tallies, most likely first.
    pub ranking: Vec<HypothesisScore>,
    /// The same tallies by descending `weighted_score`.
    pub weighted_ranking: Vec<HypothesisScore>,
    pub matrix: AchMatrix,
}

impl MatrixResponse {
    fn from_analysis(analysis: &AchAnalysis) -> Self {
        let scores = score_matrix(&analysis.hypotheses, &analysis.evidence);
        let ranking = rank_hypotheses(&scores);
        let weighted_ranking = rank_by_weighted_score(&scores);
        Self {
            analysis_id: analysis.id.clone(),
            matrix: build_matrix(&analysis.hypotheses, &analysis.evidence),
            scores,
            ranking,
            weighted_ranking,
        }
    }
}

/// Load the analysis and authorize against its workspace.
async fn load(
    state: &AppState,
    ctx: &AccountContext,
    id: &str,
    access: Access,
) -> Result<AchAnalysis, ApiError> {
    let analysis = state.service.get_ach_analysis(id).await?;
    authorize(state, ctx, &analysis.workspace_id, access).await?;
    Ok(analysis)
}

pub async fn templates(_ctx: AccountContext) -> Json<&'static [AchTemplate]> {
    Json(ach_templates())
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<AchAnalysisSummary>>, ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Read).await?;
    let limit = state.limit(params.limit);
    Ok(Json(state.service.list_ach_analyses(&workspace_id, limit).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(workspace_id): Path<String>,
    Json(body): Json<CreateAnalysis>,
) -> Result<(StatusCode, Json<AchAnalysis>), ApiError> {
    authorize(&state, &ctx, &workspace_id, Access::Write).await?;
    let analysis = state
        .service
        .create_ach_analysis(
            ctx.hash(),
            &workspace_id,
            &body.title,
            body.description.as_deref(),
            body.scale_type,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(analysis)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<AchAnalysis>, ApiError> {
    Ok(Json(load(&state, &ctx, &id, Access::Read).await?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(update): Json<AchAnalysisUpdate>,
) -> Result<Json<AchAnalysis>, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    Ok(Json(
        state.service.update_ach_analysis(ctx.hash(), &id, update).await?,
    ))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    state.service.delete_ach_analysis(ctx.hash(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn transition(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(body): Json<StatusChange>,
) -> Result<Json<AchAnalysis>, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    Ok(Json(
        state
            .service
            .transition_ach_analysis(ctx.hash(), &id, body.status)
            .await?,
    ))
}

pub async fn add_hypothesis(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(body): Json<HypothesisText>,
) -> Result<(StatusCode, Json<Hypothesis>), ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    let hypothesis = state
        .service
        .add_ach_hypothesis(ctx.hash(), &id, &body.text)
        .await?;
    Ok((StatusCode::CREATED, Json(hypothesis)))
}

pub async fn update_hypothesis(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path((id, hypothesis_id)): Path<(String, String)>,
    Json(body): Json<HypothesisText>,
) -> Result<Json<Hypothesis>, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    Ok(Json(
        state
            .service
            .update_ach_hypothesis(ctx.hash(), &id, &hypothesis_id, &body.text)
            .await?,
    ))
}

pub async fn remove_hypothesis(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path((id, hypothesis_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    state
        .service
        .remove_ach_hypothesis(ctx.hash(), &id, &hypothesis_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_evidence(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(body): Json<AddEvidence>,
) -> Result<(StatusCode, Json<Evidence>), ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    let evidence = state
        .service
        .add_ach_evidence(
            ctx.hash(),
            &id,
            &body.text,
            body.source.as_deref(),
            body.weight,
            &body.scores,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(evidence)))
}

pub async fn update_evidence(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path((id, evidence_id)): Path<(String, String)>,
    Json(update): Json<EvidenceUpdate>,
) -> Result<Json<Evidence>, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    Ok(Json(
        state
            .service
            .update_ach_evidence(ctx.hash(), &id, &evidence_id, update)
            .await?,
    ))
}

pub async fn remove_evidence(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path((id, evidence_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    state
        .service
        .remove_ach_evidence(ctx.hash(), &id, &evidence_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set or clear one cell, then return the rescored matrix.
pub async fn set_score(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
    Json(body): Json<SetScore>,
) -> Result<Json<MatrixResponse>, ApiError> {
    load(&state, &ctx, &id, Access::Write).await?;
    state
        .service
        .set_ach_score(
            ctx.hash(),
            &id,
            &body.evidence_id,
            &body.hypothesis_id,
            body.score,
        )
        .await?;
    let analysis = state.service.get_ach_analysis(&id).await?;
    Ok(Json(MatrixResponse::from_analysis(&analysis)))
}

pub async fn matrix(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Path(id): Path<String>,
) -> Result<Json<MatrixResponse>, ApiError> {
    let analysis = load(&state, &ctx, &id, Access::Read).await?;
    Ok(Json(MatrixResponse::from_analysis(&analysis)))
}

pub async fn suggest(
    State(state): State<Arc<AppState>>,
    _ctx: AccountContext,
    Json(body): Json<SuggestRequest>,
) -> Result<Json<AchSuggestionReply>, ApiError> {
    if body.key_question.trim().is_empty() {
        return Err(ApiError::validation("key_question must not be empty"));
    }
    let llm = state.llm()?;
    let request = ach_suggestion_prompt(&body.key_question, body.context.as_deref());
    let reply: AchSuggestionReply = decode(llm.complete_json(request).await?)?;
    let reply = reply.normalized();
    tracing::debug!(
        hypotheses = reply.hypotheses.len(),
        evidence = reply.evidence.len(),
        "ACH suggestions"
    );
    Ok(Json(reply))
}
