//! Workspace permission checks.
//!
//! Reads need membership (any role) or a public workspace. Writes need the
//! owner or editor role. Membership changes and deletion need the owner.
//! Admin accounts pass every check.

use rt_core::entities::Workspace;
use rt_core::enums::MemberRole;

use crate::error::ApiError;
use crate::extract::AccountContext;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
    Owner,
}

impl Access {
    const fn allows(self, role: MemberRole) -> bool {
        match self {
            Self::Read => true,
            Self::Write => role.can_write(),
            Self::Owner => matches!(role, MemberRole::Owner),
        }
    }
}

/// Load the workspace and check the caller's access to it.
pub(crate) async fn authorize(
    state: &AppState,
    ctx: &AccountContext,
    workspace_id: &str,
    access: Access,
) -> Result<Workspace, ApiError> {
    let workspace = state.service.get_workspace(workspace_id).await?;
    if ctx.is_admin() {
        return Ok(workspace);
    }
    if access == Access::Read && workspace.is_public {
        return Ok(workspace);
    }
    match state.service.member_role(workspace_id, ctx.hash()).await? {
        Some(role) if access.allows(role) => Ok(workspace),
        Some(_) => Err(ApiError::forbidden(format!(
            "your role in workspace {workspace_id} does not allow this"
        ))),
        None => Err(ApiError::forbidden(format!(
            "not a member of workspace {workspace_id}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_matrix() {
        assert!(Access::Read.allows(MemberRole::Viewer));
        assert!(!Access::Write.allows(MemberRole::Viewer));
        assert!(Access::Write.allows(MemberRole::Editor));
        assert!(!Access::Owner.allows(MemberRole::Editor));
        assert!(Access::Owner.allows(MemberRole::Owner));
    }
}
