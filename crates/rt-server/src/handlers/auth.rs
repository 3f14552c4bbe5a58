//! Hash-based registration and login.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rt_auth::{mask_account_hash, validate_account_hash};
use rt_core::enums::AccountRole;
use rt_core::responses::{LoginResponse, RegisterResponse, ValidateResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub account_hash: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let account = state.service.register_account(AccountRole::Analyst).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse::new(account.account_hash)),
    ))
}

/// Log in with an account hash. An unknown but well-formed hash creates a
/// new analyst account.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let hash = body.account_hash.trim();
    validate_account_hash(hash)?;
    let (account, created) = state.service.login_account(hash).await?;
    if !account.is_active {
        return Err(rt_auth::AuthError::AccountInactive.into());
    }
    tracing::info!(account = %mask_account_hash(hash), created, "login");
    Ok(Json(LoginResponse { account, created }))
}

pub async fn validate(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<ValidateResponse>, ApiError> {
    if validate_account_hash(&hash).is_err() {
        return Ok(Json(ValidateResponse {
            valid: false,
            exists: false,
        }));
    }
    let exists = state.service.account_exists(&hash).await?;
    Ok(Json(ValidateResponse {
        valid: true,
        exists,
    }))
}
