use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use rt_core::entities::Feedback;
use rt_core::enums::FeedbackCategory;
use serde::Deserialize;

use super::ListParams;
use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitFeedback {
    #[serde(default)]
    pub category: FeedbackCategory,
    pub message: String,
    #[serde(default)]
    pub page: Option<String>,
}

/// Anyone may submit feedback; a bearer header attributes it to the account.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SubmitFeedback>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let ctx = AccountContext::optional(&state, &headers).await?;
    let feedback = state
        .service
        .submit_feedback(
            ctx.as_ref().map(AccountContext::hash),
            body.category,
            &body.message,
            body.page.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

/// Admin only.
pub async fn list(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    if !ctx.is_admin() {
        return Err(ApiError::forbidden("feedback is visible to admins only"));
    }
    Ok(Json(
        state.service.list_feedback(state.limit(params.limit)).await?,
    ))
}
