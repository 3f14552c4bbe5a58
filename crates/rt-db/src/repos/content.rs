//! Content analysis repository and analyst claim adjustments.
//!
//! `claim_analysis` is stored as the JSON text produced by the LLM pipeline:
//! `{"claims": [{"claim": ..., "deception_analysis": {"risk_score": ..}}]}`.
//! Adjustments override a claim's risk score by index without rewriting that
//! document.

use chrono::Utc;

use rt_core::entities::{ClaimAdjustment, ContentAnalysis};
use rt_core::enums::{ActivityAction, EntityType};
use rt_core::ids::{PREFIX_ADJUSTMENT, PREFIX_CONTENT};

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, get_u32, parse_datetime, parse_json, require_text};
use crate::repos::activity::ActivityRecord;
use crate::service::ResearchService;

const SELECT_COLS: &str = "id, workspace_id, url, title, content_text, summary, entities, claim_analysis, is_saved, created_by, created_at, updated_at";

const ADJUSTMENT_COLS: &str = "id, content_analysis_id, claim_index, original_risk_score, adjusted_risk_score, reason, adjusted_by, created_at";

/// Claim risk scores live on a 0-100 scale.
pub const MAX_CLAIM_RISK: f64 = 100.0;

/// Fields of a new content analysis.
#[derive(Debug, Clone, Default)]
pub struct NewContentAnalysis<'a> {
    pub url: Option<&'a str>,
    pub title: Option<&'a str>,
    pub content_text: &'a str,
    pub summary: Option<&'a str>,
    pub entities: serde_json::Value,
    pub claim_analysis: Option<&'a str>,
}

fn row_to_content(row: &libsql::Row) -> Result<ContentAnalysis, DatabaseError> {
    Ok(ContentAnalysis {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        url: get_opt_string(row, 2)?,
        title: get_opt_string(row, 3)?,
        content_text: row.get(4)?,
        summary: get_opt_string(row, 5)?,
        entities: parse_json(&row.get::<String>(6)?)?,
        claim_analysis: get_opt_string(row, 7)?,
        is_saved: get_bool(row, 8)?,
        created_by: get_opt_string(row, 9)?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

fn row_to_adjustment(row: &libsql::Row) -> Result<ClaimAdjustment, DatabaseError> {
    Ok(ClaimAdjustment {
        id: row.get(0)?,
        content_analysis_id: row.get(1)?,
        claim_index: get_u32(row, 2)?,
        original_risk_score: row.get::<Option<f64>>(3)?,
        adjusted_risk_score: row.get::<f64>(4)?,
        reason: get_opt_string(row, 5)?,
        adjusted_by: row.get(6)?,
        created_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// The claim at `index`, or `None` when the document has no such claim.
///
/// Returns `Some(None)` for a claim that exists but has no numeric risk score.
fn claim_risk_at(claim_analysis: Option<&str>, index: u32) -> Option<Option<f64>> {
    let doc: serde_json::Value = serde_json::from_str(claim_analysis?).ok()?;
    let claim = doc.get("claims")?.as_array()?.get(usize::try_from(index).ok()?)?;
    Some(
        claim
            .get("deception_analysis")
            .and_then(|analysis| analysis.get("risk_score"))
            .and_then(serde_json::Value::as_f64),
    )
}

impl ResearchService {
    /// Store a fresh, unsaved content analysis. Unsaved rows are removed by
    /// the retention cleanup.
    pub async fn create_content_analysis(
        &self,
        by: &str,
        workspace_id: &str,
        new: &NewContentAnalysis<'_>,
    ) -> Result<ContentAnalysis, DatabaseError> {
        require_text("content_text", new.content_text)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CONTENT).await?;

        self.db()
            .execute(
                "INSERT INTO content_analyses (id, workspace_id, url, title, content_text, summary, entities, claim_analysis, is_saved, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?10, ?11)",
                libsql::params![
                    id.as_str(),
                    workspace_id,
                    new.url,
                    new.title,
                    new.content_text,
                    new.summary,
                    new.entities.to_string(),
                    new.claim_analysis,
                    by,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::ContentAnalysis,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: new.url.map(|url| serde_json::json!({ "url": url })),
        })
        .await?;

        Ok(ContentAnalysis {
            id,
            workspace_id: workspace_id.to_string(),
            url: new.url.map(String::from),
            title: new.title.map(String::from),
            content_text: new.content_text.to_string(),
            summary: new.summary.map(String::from),
            entities: new.entities.clone(),
            claim_analysis: new.claim_analysis.map(String::from),
            is_saved: false,
            created_by: Some(by.to_string()),
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_content_analysis(&self, id: &str) -> Result<ContentAnalysis, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {SELECT_COLS} FROM content_analyses WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_content(&row)
    }

    /// Content analyses of a workspace, newest first. `None` returns every row.
    pub async fn list_content_analyses(
        &self,
        workspace_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<ContentAnalysis>, DatabaseError> {
        let limit_clause = limit.map_or_else(String::new, |n| format!(" LIMIT {n}"));
        let sql = format!(
            "SELECT {SELECT_COLS} FROM content_analyses WHERE workspace_id = ?1
             ORDER BY created_at DESC, id{limit_clause}"
        );
        let mut rows = self.db().query(&sql, [workspace_id]).await?;
        let mut contents = Vec::new();
        while let Some(row) = rows.next().await? {
            contents.push(row_to_content(&row)?);
        }
        Ok(contents)
    }

    /// Mark an analysis as saved so retention cleanup keeps it.
    pub async fn save_content_analysis(
        &self,
        by: &str,
        id: &str,
    ) -> Result<ContentAnalysis, DatabaseError> {
        let changed = self
            .db()
            .execute(
                "UPDATE content_analyses SET is_saved = 1, updated_at = ?1 WHERE id = ?2",
                libsql::params![Utc::now().to_rfc3339(), id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        let saved = self.get_content_analysis(id).await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&saved.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::ContentAnalysis,
            entity_id: id,
            action: ActivityAction::Updated,
            detail: Some(serde_json::json!({ "is_saved": true })),
        })
        .await?;
        Ok(saved)
    }

    pub async fn delete_content_analysis(&self, by: &str, id: &str) -> Result<(), DatabaseError> {
        let content = self.get_content_analysis(id).await?;
        self.db()
            .execute("DELETE FROM content_analyses WHERE id = ?1", [id])
            .await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&content.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::ContentAnalysis,
            entity_id: id,
            action: ActivityAction::Deleted,
            detail: None,
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Claim adjustments
    // -----------------------------------------------------------------------

    /// Override the risk score of claim `claim_index`. A second adjustment of
    /// the same claim replaces the first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` when the score is outside
    /// `0..=100` or the analysis has no claim at that index.
    pub async fn adjust_claim(
        &self,
        by: &str,
        content_id: &str,
        claim_index: u32,
        adjusted_risk_score: f64,
        reason: Option<&str>,
    ) -> Result<ClaimAdjustment, DatabaseError> {
        if !adjusted_risk_score.is_finite() || !(0.0..=MAX_CLAIM_RISK).contains(&adjusted_risk_score) {
            return Err(DatabaseError::Validation(format!(
                "adjusted risk score {adjusted_risk_score} is outside 0..=100"
            )));
        }
        let content = self.get_content_analysis(content_id).await?;
        let original_risk_score = claim_risk_at(content.claim_analysis.as_deref(), claim_index)
            .ok_or_else(|| {
                DatabaseError::Validation(format!(
                    "content analysis {content_id} has no claim {claim_index}"
                ))
            })?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ADJUSTMENT).await?;
        self.db()
            .execute(
                "INSERT INTO claim_adjustments (id, content_analysis_id, claim_index, original_risk_score, adjusted_risk_score, reason, adjusted_by, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (content_analysis_id, claim_index) DO UPDATE SET
                     adjusted_risk_score = excluded.adjusted_risk_score,
                     reason = excluded.reason,
                     adjusted_by = excluded.adjusted_by,
                     created_at = excluded.created_at",
                libsql::params![
                    id.as_str(),
                    content_id,
                    i64::from(claim_index),
                    original_risk_score,
                    adjusted_risk_score,
                    reason,
                    by,
                    now.to_rfc3339()
                ],
            )
            .await?;

        let mut rows = self
            .db()
            .query(
                &format!(
                    "SELECT {ADJUSTMENT_COLS} FROM claim_adjustments
                     WHERE content_analysis_id = ?1 AND claim_index = ?2"
                ),
                libsql::params![content_id, i64::from(claim_index)],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let adjustment = row_to_adjustment(&row)?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&content.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::ClaimAdjustment,
            entity_id: &adjustment.id,
            action: ActivityAction::Adjusted,
            detail: Some(serde_json::json!({
                "content_analysis_id": content_id,
                "claim_index": claim_index,
                "from": original_risk_score,
                "to": adjusted_risk_score,
            })),
        })
        .await?;
        Ok(adjustment)
    }

    pub async fn list_claim_adjustments(
        &self,
        content_id: &str,
    ) -> Result<Vec<ClaimAdjustment>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!(
                    "SELECT {ADJUSTMENT_COLS} FROM claim_adjustments
                     WHERE content_analysis_id = ?1 ORDER BY claim_index"
                ),
                [content_id],
            )
            .await?;
        let mut adjustments = Vec::new();
        while let Some(row) = rows.next().await? {
            adjustments.push(row_to_adjustment(&row)?);
        }
        Ok(adjustments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_service, test_workspace};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn claims_doc(scores: &[f64]) -> String {
        let claims: Vec<_> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| json!({"claim": format!("claim {i}"), "deception_analysis": {"risk_score": s}}))
            .collect();
        json!({ "claims": claims }).to_string()
    }

    async fn content_with_claims(svc: &ResearchService, scores: &[f64]) -> (String, ContentAnalysis) {
        let (owner, ws) = test_workspace(svc).await;
        let doc = claims_doc(scores);
        let content = svc
            .create_content_analysis(
                &owner,
                &ws,
                &NewContentAnalysis {
                    url: Some("https://example.org/a"),
                    title: Some("Article"),
                    content_text: "Body text",
                    entities: json!({"people": ["A. Person"]}),
                    claim_analysis: Some(&doc),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (owner, content)
    }

    #[test]
    fn claim_lookup_handles_missing_pieces() {
        let doc = claims_doc(&[40.0]);
        assert_eq!(claim_risk_at(Some(&doc), 0), Some(Some(40.0)));
        assert_eq!(claim_risk_at(Some(&doc), 1), None);
        assert_eq!(claim_risk_at(None, 0), None);
        assert_eq!(claim_risk_at(Some("{bad"), 0), None);
        assert_eq!(
            claim_risk_at(Some(r#"{"claims":[{"claim":"x"}]}"#), 0),
            Some(None)
        );
    }

    #[tokio::test]
    async fn create_is_unsaved_and_save_flips_flag() {
        let svc = test_service().await;
        let (owner, content) = content_with_claims(&svc, &[10.0]).await;
        assert!(!content.is_saved);
        assert_eq!(content.created_by.as_deref(), Some(owner.as_str()));

        let saved = svc.save_content_analysis(&owner, &content.id).await.unwrap();
        assert!(saved.is_saved);
        assert_eq!(saved.entities, json!({"people": ["A. Person"]}));
    }

    #[tokio::test]
    async fn adjustment_records_original_and_replaces_previous() {
        let svc = test_service().await;
        let (owner, content) = content_with_claims(&svc, &[30.0, 85.0]).await;

        let first = svc
            .adjust_claim(&owner, &content.id, 1, 60.0, Some("Corroborated elsewhere"))
            .await
            .unwrap();
        assert_eq!(first.original_risk_score, Some(85.0));
        assert!((first.adjusted_risk_score - 60.0).abs() < f64::EPSILON);

        svc.adjust_claim(&owner, &content.id, 1, 20.0, None).await.unwrap();
        let all = svc.list_claim_adjustments(&content.id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!((all[0].adjusted_risk_score - 20.0).abs() < f64::EPSILON);
        assert_eq!(all[0].reason, None);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(100.5)]
    #[case(f64::NAN)]
    #[tokio::test]
    async fn out_of_range_adjustment_is_rejected(#[case] score: f64) {
        let svc = test_service().await;
        let (owner, content) = content_with_claims(&svc, &[30.0]).await;
        let err = svc
            .adjust_claim(&owner, &content.id, 0, score, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn adjusting_missing_claim_is_rejected() {
        let svc = test_service().await;
        let (owner, content) = content_with_claims(&svc, &[30.0]).await;
        let err = svc
            .adjust_claim(&owner, &content.id, 5, 50.0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_cascades_adjustments() {
        let svc = test_service().await;
        let (owner, content) = content_with_claims(&svc, &[30.0]).await;
        svc.adjust_claim(&owner, &content.id, 0, 50.0, None).await.unwrap();
        svc.delete_content_analysis(&owner, &content.id).await.unwrap();
        assert!(svc.list_claim_adjustments(&content.id).await.unwrap().is_empty());
        assert!(svc
            .list_content_analyses(&content.workspace_id, None)
            .await
            .unwrap()
            .is_empty());
    }
}
