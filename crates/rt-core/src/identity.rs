use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AccountRole;

/// Authenticated account identity for one request.
///
/// Produced by `rt-auth`/`rt-server` after the bearer hash is resolved and
/// passed explicitly to every service call that needs it. Never stored in
/// process-global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AccountIdentity {
    /// The 16-digit account hash.
    pub account_hash: String,
    pub role: AccountRole,
}

impl AccountIdentity {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, AccountRole::Admin)
    }
}
