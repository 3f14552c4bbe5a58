//! Shared test utilities for rt-db unit tests.

pub(crate) mod helpers {
    use rt_core::enums::AccountRole;

    use crate::service::ResearchService;

    /// Create an in-memory `ResearchService`.
    pub async fn test_service() -> ResearchService {
        ResearchService::open_local(":memory:").await.unwrap()
    }

    /// Register a fresh analyst account and return its hash.
    pub async fn test_account(svc: &ResearchService) -> String {
        svc.register_account(AccountRole::Analyst)
            .await
            .unwrap()
            .account_hash
    }

    /// Register an owner and create a private workspace. Returns `(owner, workspace_id)`.
    pub async fn test_workspace(svc: &ResearchService) -> (String, String) {
        let owner = test_account(svc).await;
        let ws = svc
            .create_workspace(&owner, "Test workspace", None, false)
            .await
            .unwrap();
        (owner, ws.id)
    }
}
