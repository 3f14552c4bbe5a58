//! Request-scoped account resolution.
//!
//! The bearer hash is resolved into an [`AccountIdentity`] on every request.
//! Nothing about the caller is cached between requests.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use rt_auth::{AccountIdentity, bearer_token, mask_account_hash, validate_account_hash};
use rt_db::error::DatabaseError;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AccountContext(pub AccountIdentity);

impl AccountContext {
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.0.account_hash
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.0.is_admin()
    }

    /// Resolve an `Authorization` header value against the account table.
    pub(crate) async fn resolve(state: &AppState, header: Option<&str>) -> Result<Self, ApiError> {
        let hash = bearer_token(header)?;
        validate_account_hash(hash)?;
        let account = match state.service.get_account(hash).await {
            Ok(account) => account,
            Err(DatabaseError::NoResult) => {
                return Err(ApiError::Unauthorized("unknown account".to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        if !account.is_active {
            tracing::info!(account = %mask_account_hash(hash), "rejected inactive account");
            return Err(rt_auth::AuthError::AccountInactive.into());
        }
        Ok(Self(AccountIdentity {
            account_hash: account.account_hash,
            role: account.role,
        }))
    }

    /// Resolve the caller when a header is present; anonymous otherwise.
    pub(crate) async fn optional(state: &AppState, headers: &HeaderMap) -> Result<Option<Self>, ApiError> {
        match authorization(headers) {
            None => Ok(None),
            header => Self::resolve(state, header).await.map(Some),
        }
    }
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

impl FromRequestParts<Arc<AppState>> for AccountContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Self::resolve(state, authorization(&parts.headers)).await
    }
}
