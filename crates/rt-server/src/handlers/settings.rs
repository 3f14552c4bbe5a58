use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use rt_core::entities::AccountSettings;

use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

pub async fn get(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
) -> Result<Json<AccountSettings>, ApiError> {
    Ok(Json(state.service.get_settings(ctx.hash()).await?))
}

/// Replace the caller's settings document.
pub async fn put(
    State(state): State<Arc<AppState>>,
    ctx: AccountContext,
    Json(settings): Json<serde_json::Value>,
) -> Result<Json<AccountSettings>, ApiError> {
    Ok(Json(state.service.put_settings(ctx.hash(), settings).await?))
}
