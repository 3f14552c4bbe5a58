//! API error type and its JSON rendering.
//!
//! Every handler returns `Result<_, ApiError>`. Domain errors convert through
//! `From` so handlers can use `?` directly on service calls.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rt_auth::AuthError;
use rt_db::error::DatabaseError;
use rt_llm::LlmError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The LLM collaborator failed or is not configured.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short bucket message placed in the `error` field.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation failed",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not found",
            Self::Conflict(_) => "conflict",
            Self::Upstream(_) => "upstream service failed",
            Self::Internal(_) => "internal server error",
        }
    }

    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::Forbidden(details.into())
    }

    pub fn validation(details: impl Into<String>) -> Self {
        Self::Validation(details.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                "an unexpected error occurred".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": self.error_type(),
            "details": details,
        }));
        (status, body).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NoResult => Self::NotFound("resource not found".to_string()),
            DatabaseError::Validation(message) => Self::Validation(message),
            DatabaseError::InvalidState(message) | DatabaseError::Constraint(message) => {
                Self::Conflict(message)
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials
            | AuthError::InvalidScheme
            | AuthError::InvalidAccountHash => Self::Unauthorized(err.to_string()),
            AuthError::AccountInactive => Self::Forbidden(err.to_string()),
            AuthError::Randomness(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        tracing::warn!(error = %err, "LLM call failed");
        Self::Upstream(err.to_string())
    }
}
