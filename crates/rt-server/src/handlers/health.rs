use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use rt_core::responses::HealthResponse;

use crate::state::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_configured: state.llm.is_some(),
    })
}
