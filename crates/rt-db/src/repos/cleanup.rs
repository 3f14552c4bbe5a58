//! Retention cleanup for unsaved content analyses.

use chrono::{Duration, Utc};

use crate::error::DatabaseError;
use crate::service::ResearchService;

impl ResearchService {
    /// Delete unsaved content analyses created more than `retention_days`
    /// ago. Returns the number of rows removed.
    ///
    /// Timestamps are stored as RFC 3339 in UTC, so a string comparison
    /// orders them correctly.
    pub async fn cleanup_unsaved_content(&self, retention_days: u32) -> Result<u64, DatabaseError> {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
        let deleted = self
            .db()
            .execute(
                "DELETE FROM content_analyses WHERE is_saved = 0 AND created_at < ?1",
                [cutoff.to_rfc3339()],
            )
            .await?;
        if deleted > 0 {
            tracing::info!(deleted, retention_days, "removed unsaved content analyses");
        } else {
            tracing::debug!(retention_days, "no unsaved content past retention");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::repos::content::NewContentAnalysis;
    use crate::service::ResearchService;
    use crate::test_support::helpers::{test_service, test_workspace};

    async fn backdate(svc: &ResearchService, id: &str, days: i64) {
        let then = (Utc::now() - Duration::days(days)).to_rfc3339();
        svc.db()
            .execute(
                "UPDATE content_analyses SET created_at = ?1 WHERE id = ?2",
                [then.as_str(), id],
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn removes_only_old_unsaved_rows() {
        let svc = test_service().await;
        let (owner, ws) = test_workspace(&svc).await;
        let new = NewContentAnalysis {
            content_text: "body",
            entities: json!({}),
            ..Default::default()
        };

        let old_unsaved = svc.create_content_analysis(&owner, &ws, &new).await.unwrap();
        let old_saved = svc.create_content_analysis(&owner, &ws, &new).await.unwrap();
        let fresh = svc.create_content_analysis(&owner, &ws, &new).await.unwrap();
        svc.save_content_analysis(&owner, &old_saved.id).await.unwrap();
        backdate(&svc, &old_unsaved.id, 10).await;
        backdate(&svc, &old_saved.id, 10).await;

        assert_eq!(svc.cleanup_unsaved_content(7).await.unwrap(), 1);

        let remaining: Vec<_> = svc
            .list_content_analyses(&ws, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert!(remaining.contains(&old_saved.id));
        assert!(remaining.contains(&fresh.id));
        assert!(!remaining.contains(&old_unsaved.id));
    }

    #[tokio::test]
    async fn nothing_to_delete_returns_zero() {
        let svc = test_service().await;
        assert_eq!(svc.cleanup_unsaved_content(7).await.unwrap(), 0);
    }
}
