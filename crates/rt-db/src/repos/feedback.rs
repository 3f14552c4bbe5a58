//! Feedback repository. Anonymous submissions are allowed.

use chrono::Utc;

use rt_core::entities::Feedback;
use rt_core::enums::{ActivityAction, EntityType, FeedbackCategory};
use rt_core::ids::PREFIX_FEEDBACK;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, require_text};
use crate::repos::activity::ActivityRecord;
use crate::service::ResearchService;

const SELECT_COLS: &str = "id, account_hash, category, message, page, created_at";

fn row_to_feedback(row: &libsql::Row) -> Result<Feedback, DatabaseError> {
    Ok(Feedback {
        id: row.get(0)?,
        account_hash: get_opt_string(row, 1)?,
        category: parse_enum(&row.get::<String>(2)?)?,
        message: row.get(3)?,
        page: get_opt_string(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl ResearchService {
    pub async fn submit_feedback(
        &self,
        account_hash: Option<&str>,
        category: FeedbackCategory,
        message: &str,
        page: Option<&str>,
    ) -> Result<Feedback, DatabaseError> {
        require_text("message", message)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_FEEDBACK).await?;

        self.db()
            .execute(
                "INSERT INTO feedback (id, account_hash, category, message, page, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    id.as_str(),
                    account_hash,
                    category.as_str(),
                    message,
                    page,
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: None,
            account_hash,
            entity_type: EntityType::Feedback,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: Some(serde_json::json!({ "category": category.as_str() })),
        })
        .await?;

        Ok(Feedback {
            id,
            account_hash: account_hash.map(String::from),
            category,
            message: message.to_string(),
            page: page.map(String::from),
            created_at: now,
        })
    }

    pub async fn list_feedback(&self, limit: u32) -> Result<Vec<Feedback>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {SELECT_COLS} FROM feedback ORDER BY created_at DESC, rowid DESC LIMIT {limit}"),
                (),
            )
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(row_to_feedback(&row)?);
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn anonymous_and_signed_feedback() {
        let svc = test_service().await;
        svc.submit_feedback(None, FeedbackCategory::Bug, "Matrix overflows", Some("/ach"))
            .await
            .unwrap();
        svc.submit_feedback(Some("1234567890123456"), FeedbackCategory::Feature, "Export", None)
            .await
            .unwrap();

        let items = svc.list_feedback(10).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, FeedbackCategory::Feature);
        assert_eq!(items[1].account_hash, None);
        assert_eq!(items[1].page.as_deref(), Some("/ach"));
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let svc = test_service().await;
        let err = svc
            .submit_feedback(None, FeedbackCategory::General, "   ", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }
}
