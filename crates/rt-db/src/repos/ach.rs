//! ACH repository.
//!
//! An analysis is stored across four tables: the analysis row, ordered
//! hypotheses, ordered evidence, and one `ach_scores` row per scored cell.
//! `get_ach_analysis` hydrates all of them into the nested entity the scorer
//! consumes. Child mutations bump the parent's `updated_at`.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;

use rt_core::entities::{AchAnalysis, AchAnalysisSummary, Evidence, Hypothesis};
use rt_core::enums::{AchScaleType, AchScore, ActivityAction, AnalysisStatus, EntityType};
use rt_core::ids::{PREFIX_ACH, PREFIX_EVIDENCE, PREFIX_HYPOTHESIS};

use crate::error::DatabaseError;
use crate::helpers::{
    SetClauses, get_opt_string, get_opt_u8, get_u32, parse_datetime, parse_enum, require_text,
};
use crate::repos::activity::{ActivityRecord, status_detail, to_detail};
use crate::service::ResearchService;
use crate::updates::ach::{AchAnalysisUpdate, EvidenceUpdate};

const SELECT_COLS: &str =
    "id, workspace_id, title, description, scale_type, status, created_at, updated_at";

/// Analysis row without its children.
struct AnalysisRow {
    id: String,
    workspace_id: String,
    title: String,
    description: Option<String>,
    scale_type: AchScaleType,
    status: AnalysisStatus,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
}

impl AnalysisRow {
    fn hydrate(self, hypotheses: Vec<Hypothesis>, evidence: Vec<Evidence>) -> AchAnalysis {
        AchAnalysis {
            id: self.id,
            workspace_id: self.workspace_id,
            title: self.title,
            description: self.description,
            scale_type: self.scale_type,
            status: self.status,
            hypotheses,
            evidence,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn row_to_analysis(row: &libsql::Row) -> Result<AnalysisRow, DatabaseError> {
    Ok(AnalysisRow {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        title: row.get(2)?,
        description: get_opt_string(row, 3)?,
        scale_type: parse_enum(&row.get::<String>(4)?)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

/// Reject a weight that is not on the analysis scale.
fn check_weight(scale: AchScaleType, weight: Option<u8>) -> Result<(), DatabaseError> {
    match weight {
        Some(weight) if !scale.accepts_weight(weight) => Err(DatabaseError::Validation(format!(
            "weight {weight} is not on the {scale} scale {:?}",
            scale.weights()
        ))),
        _ => Ok(()),
    }
}

fn weight_value(weight: Option<u8>) -> libsql::Value {
    weight.map_or(libsql::Value::Null, |w| libsql::Value::Integer(i64::from(w)))
}

fn row_to_summary(row: &libsql::Row) -> Result<AchAnalysisSummary, DatabaseError> {
    Ok(AchAnalysisSummary {
        id: row.get(0)?,
        workspace_id: row.get(1)?,
        title: row.get(2)?,
        scale_type: parse_enum(&row.get::<String>(3)?)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        hypothesis_count: get_u32(row, 5)?,
        evidence_count: get_u32(row, 6)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl ResearchService {
    // -----------------------------------------------------------------------
    // Analyses
    // -----------------------------------------------------------------------

    pub async fn create_ach_analysis(
        &self,
        by: &str,
        workspace_id: &str,
        title: &str,
        description: Option<&str>,
        scale_type: AchScaleType,
    ) -> Result<AchAnalysis, DatabaseError> {
        require_text("title", title)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ACH).await?;
        let status = AnalysisStatus::Draft;

        self.db()
            .execute(
                "INSERT INTO ach_analyses (id, workspace_id, title, description, scale_type, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    workspace_id,
                    title,
                    description,
                    scale_type.as_str(),
                    status.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchAnalysis,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: None,
        })
        .await?;

        Ok(AchAnalysis {
            id,
            workspace_id: workspace_id.to_string(),
            title: title.to_string(),
            description: description.map(String::from),
            scale_type,
            status,
            hypotheses: Vec::new(),
            evidence: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_analysis_row(&self, id: &str) -> Result<AnalysisRow, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {SELECT_COLS} FROM ach_analyses WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_analysis(&row)
    }

    /// Load an analysis with hypotheses and evidence in display order and
    /// every scored cell attached to its evidence item.
    pub async fn get_ach_analysis(&self, id: &str) -> Result<AchAnalysis, DatabaseError> {
        let analysis = self.get_analysis_row(id).await?;

        let mut hypotheses = Vec::new();
        let mut rows = self
            .db()
            .query(
                "SELECT id, text FROM ach_hypotheses WHERE analysis_id = ?1 ORDER BY position, id",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            hypotheses.push(Hypothesis {
                id: row.get(0)?,
                text: row.get(1)?,
            });
        }

        let mut scores: BTreeMap<String, BTreeMap<String, AchScore>> = BTreeMap::new();
        let mut rows = self
            .db()
            .query(
                "SELECT s.evidence_id, s.hypothesis_id, s.score FROM ach_scores s
                 JOIN ach_evidence e ON e.id = s.evidence_id
                 WHERE e.analysis_id = ?1",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let evidence_id: String = row.get(0)?;
            let hypothesis_id: String = row.get(1)?;
            let score: AchScore = parse_enum(&row.get::<String>(2)?)?;
            scores
                .entry(evidence_id)
                .or_default()
                .insert(hypothesis_id, score);
        }

        let mut evidence = Vec::new();
        let mut rows = self
            .db()
            .query(
                "SELECT id, text, source, weight FROM ach_evidence WHERE analysis_id = ?1 ORDER BY position, id",
                [id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let evidence_id: String = row.get(0)?;
            let hypotheses_scores = scores.remove(&evidence_id).unwrap_or_default();
            evidence.push(Evidence {
                id: evidence_id,
                text: row.get(1)?,
                source: get_opt_string(&row, 2)?,
                weight: get_opt_u8(&row, 3)?,
                hypotheses_scores,
            });
        }

        Ok(analysis.hydrate(hypotheses, evidence))
    }

    pub async fn list_ach_analyses(
        &self,
        workspace_id: &str,
        limit: u32,
    ) -> Result<Vec<AchAnalysisSummary>, DatabaseError> {
        let sql = format!(
            "SELECT a.id, a.workspace_id, a.title, a.scale_type, a.status,
                    (SELECT COUNT(*) FROM ach_hypotheses h WHERE h.analysis_id = a.id),
                    (SELECT COUNT(*) FROM ach_evidence e WHERE e.analysis_id = a.id),
                    a.updated_at
             FROM ach_analyses a
             WHERE a.workspace_id = ?1
             ORDER BY a.updated_at DESC LIMIT {limit}"
        );
        let mut rows = self.db().query(&sql, [workspace_id]).await?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await? {
            summaries.push(row_to_summary(&row)?);
        }
        Ok(summaries)
    }

    pub async fn update_ach_analysis(
        &self,
        by: &str,
        id: &str,
        update: AchAnalysisUpdate,
    ) -> Result<AchAnalysis, DatabaseError> {
        let mut sets = SetClauses::new();
        if let Some(ref title) = update.title {
            require_text("title", title)?;
            sets.push_text("title", title);
        }
        if let Some(ref description) = update.description {
            sets.push_nullable("description", description.as_deref());
        }
        if let Some(scale_type) = update.scale_type {
            let current = self.get_ach_analysis(id).await?;
            if let Some((evidence_id, weight)) =
                rt_analysis::ach::off_scale_weight(scale_type, &current.evidence)
            {
                return Err(DatabaseError::Validation(format!(
                    "evidence {evidence_id} has weight {weight}, which is not on the {scale_type} scale"
                )));
            }
            sets.push_text("scale_type", scale_type.as_str());
        }
        if sets.is_empty() {
            return self.get_ach_analysis(id).await;
        }

        sets.push_text("updated_at", &Utc::now().to_rfc3339());
        let (sql, params) = sets.into_update("ach_analyses", "id", id);
        let changed = self
            .db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }

        let updated = self.get_ach_analysis(id).await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&updated.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchAnalysis,
            entity_id: id,
            action: ActivityAction::Updated,
            detail: Some(to_detail(&update)?),
        })
        .await?;
        Ok(updated)
    }

    /// Delete an analysis; hypotheses, evidence, and scores cascade.
    pub async fn delete_ach_analysis(&self, by: &str, id: &str) -> Result<(), DatabaseError> {
        let analysis = self.get_analysis_row(id).await?;
        self.db()
            .execute("DELETE FROM ach_analyses WHERE id = ?1", [id])
            .await?;
        self.append_activity(ActivityRecord {
            workspace_id: Some(&analysis.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchAnalysis,
            entity_id: id,
            action: ActivityAction::Deleted,
            detail: Some(serde_json::json!({ "title": analysis.title })),
        })
        .await?;
        Ok(())
    }

    pub async fn transition_ach_analysis(
        &self,
        by: &str,
        id: &str,
        new_status: AnalysisStatus,
    ) -> Result<AchAnalysis, DatabaseError> {
        let current = self.get_analysis_row(id).await?;
        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition ACH analysis {id} from {} to {new_status}",
                current.status
            )));
        }

        let now = Utc::now();
        self.db()
            .execute(
                "UPDATE ach_analyses SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![new_status.as_str(), now.to_rfc3339(), id],
            )
            .await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&current.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchAnalysis,
            entity_id: id,
            action: ActivityAction::StatusChanged,
            detail: Some(status_detail(current.status.as_str(), new_status.as_str())),
        })
        .await?;
        self.get_ach_analysis(id).await
    }

    async fn touch_analysis(&self, id: &str) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "UPDATE ach_analyses SET updated_at = ?1 WHERE id = ?2",
                libsql::params![Utc::now().to_rfc3339(), id],
            )
            .await?;
        Ok(())
    }

    async fn hypothesis_ids(&self, analysis_id: &str) -> Result<HashSet<String>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT id FROM ach_hypotheses WHERE analysis_id = ?1",
                [analysis_id],
            )
            .await?;
        let mut ids = HashSet::new();
        while let Some(row) = rows.next().await? {
            ids.insert(row.get::<String>(0)?);
        }
        Ok(ids)
    }

    // -----------------------------------------------------------------------
    // Hypotheses
    // -----------------------------------------------------------------------

    /// Append a hypothesis as the last column of the matrix.
    pub async fn add_ach_hypothesis(
        &self,
        by: &str,
        analysis_id: &str,
        text: &str,
    ) -> Result<Hypothesis, DatabaseError> {
        require_text("text", text)?;
        let analysis = self.get_analysis_row(analysis_id).await?;
        let id = self.db().generate_id(PREFIX_HYPOTHESIS).await?;

        self.db()
            .execute(
                "INSERT INTO ach_hypotheses (id, analysis_id, text, position, created_at)
                 VALUES (?1, ?2, ?3,
                         (SELECT COALESCE(MAX(position), -1) + 1 FROM ach_hypotheses WHERE analysis_id = ?2),
                         ?4)",
                libsql::params![id.as_str(), analysis_id, text, Utc::now().to_rfc3339()],
            )
            .await?;
        self.touch_analysis(analysis_id).await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&analysis.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchHypothesis,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: Some(serde_json::json!({ "analysis_id": analysis_id })),
        })
        .await?;

        Ok(Hypothesis {
            id,
            text: text.to_string(),
        })
    }

    pub async fn update_ach_hypothesis(
        &self,
        by: &str,
        analysis_id: &str,
        hypothesis_id: &str,
        text: &str,
    ) -> Result<Hypothesis, DatabaseError> {
        require_text("text", text)?;
        let analysis = self.get_analysis_row(analysis_id).await?;
        let changed = self
            .db()
            .execute(
                "UPDATE ach_hypotheses SET text = ?1 WHERE id = ?2 AND analysis_id = ?3",
                libsql::params![text, hypothesis_id, analysis_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.touch_analysis(analysis_id).await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&analysis.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchHypothesis,
            entity_id: hypothesis_id,
            action: ActivityAction::Updated,
            detail: Some(serde_json::json!({ "text": text })),
        })
        .await?;

        Ok(Hypothesis {
            id: hypothesis_id.to_string(),
            text: text.to_string(),
        })
    }

    /// Remove a hypothesis column; its scores cascade away.
    pub async fn remove_ach_hypothesis(
        &self,
        by: &str,
        analysis_id: &str,
        hypothesis_id: &str,
    ) -> Result<(), DatabaseError> {
        let analysis = self.get_analysis_row(analysis_id).await?;
        let changed = self
            .db()
            .execute(
                "DELETE FROM ach_hypotheses WHERE id = ?1 AND analysis_id = ?2",
                [hypothesis_id, analysis_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.touch_analysis(analysis_id).await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&analysis.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchHypothesis,
            entity_id: hypothesis_id,
            action: ActivityAction::Deleted,
            detail: None,
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Evidence
    // -----------------------------------------------------------------------

    /// Append an evidence row, optionally with initial scores.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if `scores` names a hypothesis
    /// that is not part of this analysis, or if `weight` is off the
    /// analysis scale.
    pub async fn add_ach_evidence(
        &self,
        by: &str,
        analysis_id: &str,
        text: &str,
        source: Option<&str>,
        weight: Option<u8>,
        scores: &BTreeMap<String, AchScore>,
    ) -> Result<Evidence, DatabaseError> {
        require_text("text", text)?;
        let analysis = self.get_analysis_row(analysis_id).await?;
        check_weight(analysis.scale_type, weight)?;
        let known = self.hypothesis_ids(analysis_id).await?;
        if let Some(unknown) = scores.keys().find(|h| !known.contains(*h)) {
            return Err(DatabaseError::Validation(format!(
                "hypothesis {unknown} is not part of analysis {analysis_id}"
            )));
        }

        let id = self.db().generate_id(PREFIX_EVIDENCE).await?;
        self.db()
            .execute(
                "INSERT INTO ach_evidence (id, analysis_id, text, source, weight, position, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5,
                         (SELECT COALESCE(MAX(position), -1) + 1 FROM ach_evidence WHERE analysis_id = ?2),
                         ?6)",
                libsql::params![
                    id.as_str(),
                    analysis_id,
                    text,
                    source,
                    weight_value(weight),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        for (hypothesis_id, score) in scores {
            self.db()
                .execute(
                    "INSERT INTO ach_scores (evidence_id, hypothesis_id, score) VALUES (?1, ?2, ?3)",
                    [id.as_str(), hypothesis_id.as_str(), score.as_str()],
                )
                .await?;
        }
        self.touch_analysis(analysis_id).await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&analysis.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchEvidence,
            entity_id: &id,
            action: ActivityAction::Created,
            detail: Some(serde_json::json!({
                "analysis_id": analysis_id,
                "scored": scores.len(),
            })),
        })
        .await?;

        Ok(Evidence {
            id,
            text: text.to_string(),
            source: source.map(String::from),
            weight,
            hypotheses_scores: scores.clone(),
        })
    }

    pub async fn update_ach_evidence(
        &self,
        by: &str,
        analysis_id: &str,
        evidence_id: &str,
        update: EvidenceUpdate,
    ) -> Result<Evidence, DatabaseError> {
        let analysis = self.get_analysis_row(analysis_id).await?;
        let mut sets = SetClauses::new();
        if let Some(ref text) = update.text {
            require_text("text", text)?;
            sets.push_text("text", text);
        }
        if let Some(ref source) = update.source {
            sets.push_nullable("source", source.as_deref());
        }
        if let Some(weight) = update.weight {
            check_weight(analysis.scale_type, weight)?;
            sets.push("weight", weight_value(weight));
        }

        if !sets.is_empty() {
            let (sql, params) = sets.into_update_where(
                "ach_evidence",
                &[("id", evidence_id), ("analysis_id", analysis_id)],
            );
            let changed = self
                .db()
                .execute(&sql, libsql::params_from_iter(params))
                .await?;
            if changed == 0 {
                return Err(DatabaseError::NoResult);
            }
            self.touch_analysis(analysis_id).await?;
            self.append_activity(ActivityRecord {
                workspace_id: Some(&analysis.workspace_id),
                account_hash: Some(by),
                entity_type: EntityType::AchEvidence,
                entity_id: evidence_id,
                action: ActivityAction::Updated,
                detail: Some(to_detail(&update)?),
            })
            .await?;
        }

        self.get_ach_analysis(analysis_id)
            .await?
            .evidence
            .into_iter()
            .find(|e| e.id == evidence_id)
            .ok_or(DatabaseError::NoResult)
    }

    /// Remove an evidence row and its scores.
    pub async fn remove_ach_evidence(
        &self,
        by: &str,
        analysis_id: &str,
        evidence_id: &str,
    ) -> Result<(), DatabaseError> {
        let analysis = self.get_analysis_row(analysis_id).await?;
        let changed = self
            .db()
            .execute(
                "DELETE FROM ach_evidence WHERE id = ?1 AND analysis_id = ?2",
                [evidence_id, analysis_id],
            )
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.touch_analysis(analysis_id).await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&analysis.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchEvidence,
            entity_id: evidence_id,
            action: ActivityAction::Deleted,
            detail: None,
        })
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Scores
    // -----------------------------------------------------------------------

    /// Set one matrix cell. `None` clears it, leaving the cell unscored.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` unless both the evidence and the
    /// hypothesis belong to `analysis_id`.
    pub async fn set_ach_score(
        &self,
        by: &str,
        analysis_id: &str,
        evidence_id: &str,
        hypothesis_id: &str,
        score: Option<AchScore>,
    ) -> Result<(), DatabaseError> {
        let analysis = self.get_analysis_row(analysis_id).await?;
        let mut rows = self
            .db()
            .query(
                "SELECT
                    (SELECT COUNT(*) FROM ach_evidence WHERE id = ?1 AND analysis_id = ?3),
                    (SELECT COUNT(*) FROM ach_hypotheses WHERE id = ?2 AND analysis_id = ?3)",
                [evidence_id, hypothesis_id, analysis_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        if row.get::<i64>(0)? == 0 || row.get::<i64>(1)? == 0 {
            return Err(DatabaseError::NoResult);
        }

        match score {
            Some(score) => {
                self.db()
                    .execute(
                        "INSERT INTO ach_scores (evidence_id, hypothesis_id, score) VALUES (?1, ?2, ?3)
                         ON CONFLICT (evidence_id, hypothesis_id) DO UPDATE SET score = excluded.score",
                        [evidence_id, hypothesis_id, score.as_str()],
                    )
                    .await?;
            }
            None => {
                self.db()
                    .execute(
                        "DELETE FROM ach_scores WHERE evidence_id = ?1 AND hypothesis_id = ?2",
                        [evidence_id, hypothesis_id],
                    )
                    .await?;
            }
        }
        self.touch_analysis(analysis_id).await?;

        self.append_activity(ActivityRecord {
            workspace_id: Some(&analysis.workspace_id),
            account_hash: Some(by),
            entity_type: EntityType::AchEvidence,
            entity_id: evidence_id,
            action: ActivityAction::Updated,
            detail: Some(serde_json::json!({
                "hypothesis_id": hypothesis_id,
                "score": score.map(AchScore::as_str),
            })),
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{test_service, test_workspace};
    use pretty_assertions::assert_eq;
    use rt_analysis::ach::score_hypothesis;

    async fn analysis_with_two_hypotheses(
        svc: &ResearchService,
    ) -> (String, AchAnalysis, Hypothesis, Hypothesis) {
        let (owner, ws) = test_workspace(svc).await;
        let analysis = svc
            .create_ach_analysis(&owner, &ws, "Who did it?", None, AchScaleType::Logarithmic)
            .await
            .unwrap();
        let h1 = svc.add_ach_hypothesis(&owner, &analysis.id, "State actor").await.unwrap();
        let h2 = svc.add_ach_hypothesis(&owner, &analysis.id, "Criminal group").await.unwrap();
        (owner, analysis, h1, h2)
    }

    #[tokio::test]
    async fn hydrated_analysis_matches_scoring_scenario() {
        let svc = test_service().await;
        let (owner, analysis, h1, h2) = analysis_with_two_hypotheses(&svc).await;

        let e1_scores = BTreeMap::from([
            (h1.id.clone(), AchScore::Supports),
            (h2.id.clone(), AchScore::Contradicts),
        ]);
        svc.add_ach_evidence(&owner, &analysis.id, "Tooling overlap", None, None, &e1_scores)
            .await
            .unwrap();
        let e2_scores = BTreeMap::from([(h1.id.clone(), AchScore::Neutral)]);
        svc.add_ach_evidence(&owner, &analysis.id, "Timing", Some("CERT"), None, &e2_scores)
            .await
            .unwrap();

        let loaded = svc.get_ach_analysis(&analysis.id).await.unwrap();
        assert_eq!(
            loaded.hypotheses.iter().map(|h| h.text.as_str()).collect::<Vec<_>>(),
            vec!["State actor", "Criminal group"]
        );
        assert_eq!(loaded.evidence.len(), 2);
        assert_eq!(loaded.evidence[1].source.as_deref(), Some("CERT"));

        let t1 = score_hypothesis(&h1.id, &loaded.evidence);
        assert_eq!((t1.supports, t1.neutral, t1.net_score), (1, 1, 1));
        let t2 = score_hypothesis(&h2.id, &loaded.evidence);
        assert_eq!((t2.contradicts, t2.net_score), (1, -1));
    }

    #[tokio::test]
    async fn evidence_with_unknown_hypothesis_is_rejected() {
        let svc = test_service().await;
        let (owner, analysis, _h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let scores = BTreeMap::from([("hyp-nothere".to_string(), AchScore::Supports)]);
        let err = svc
            .add_ach_evidence(&owner, &analysis.id, "x", None, None, &scores)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
        assert!(svc.get_ach_analysis(&analysis.id).await.unwrap().evidence.is_empty());
    }

    #[tokio::test]
    async fn evidence_weight_is_stored_and_checked_against_scale() {
        let svc = test_service().await;
        let (owner, analysis, h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let scores = BTreeMap::from([(h1.id.clone(), AchScore::Supports)]);

        let err = svc
            .add_ach_evidence(&owner, &analysis.id, "Rumor", None, Some(4), &scores)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        let evidence = svc
            .add_ach_evidence(&owner, &analysis.id, "Signals intercept", None, Some(12), &scores)
            .await
            .unwrap();
        let loaded = svc.get_ach_analysis(&analysis.id).await.unwrap();
        assert_eq!(loaded.evidence.len(), 1);
        assert_eq!(loaded.evidence[0].weight, Some(12));
        assert_eq!(score_hypothesis(&h1.id, &loaded.evidence).weighted_score, 12);

        let err = svc
            .update_ach_evidence(
                &owner,
                &analysis.id,
                &evidence.id,
                EvidenceUpdate {
                    weight: Some(Some(2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        // 12 is off the linear scale, so the scale cannot switch yet.
        let err = svc
            .update_ach_analysis(
                &owner,
                &analysis.id,
                AchAnalysisUpdate {
                    scale_type: Some(AchScaleType::Linear),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        let cleared = svc
            .update_ach_evidence(
                &owner,
                &analysis.id,
                &evidence.id,
                EvidenceUpdate {
                    weight: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.weight, None);
        let linear = svc
            .update_ach_analysis(
                &owner,
                &analysis.id,
                AchAnalysisUpdate {
                    scale_type: Some(AchScaleType::Linear),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(linear.scale_type, AchScaleType::Linear);
    }

    #[tokio::test]
    async fn set_score_upserts_and_clears() {
        let svc = test_service().await;
        let (owner, analysis, h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let evidence = svc
            .add_ach_evidence(&owner, &analysis.id, "Report", None, None, &BTreeMap::new())
            .await
            .unwrap();

        svc.set_ach_score(&owner, &analysis.id, &evidence.id, &h1.id, Some(AchScore::Supports))
            .await
            .unwrap();
        svc.set_ach_score(&owner, &analysis.id, &evidence.id, &h1.id, Some(AchScore::NotApplicable))
            .await
            .unwrap();
        let loaded = svc.get_ach_analysis(&analysis.id).await.unwrap();
        assert_eq!(
            loaded.evidence[0].score_for(&h1.id),
            Some(AchScore::NotApplicable)
        );

        svc.set_ach_score(&owner, &analysis.id, &evidence.id, &h1.id, None)
            .await
            .unwrap();
        let loaded = svc.get_ach_analysis(&analysis.id).await.unwrap();
        assert!(loaded.evidence[0].hypotheses_scores.is_empty());
    }

    #[tokio::test]
    async fn score_on_foreign_hypothesis_is_no_result() {
        let svc = test_service().await;
        let (owner, analysis, _h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let (_, other, other_h, _) = analysis_with_two_hypotheses(&svc).await;
        let evidence = svc
            .add_ach_evidence(&owner, &analysis.id, "Report", None, None, &BTreeMap::new())
            .await
            .unwrap();

        let err = svc
            .set_ach_score(&owner, &analysis.id, &evidence.id, &other_h.id, Some(AchScore::Supports))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
        assert!(svc.get_ach_analysis(&other.id).await.unwrap().evidence.is_empty());
    }

    #[tokio::test]
    async fn removing_hypothesis_drops_its_scores() {
        let svc = test_service().await;
        let (owner, analysis, h1, h2) = analysis_with_two_hypotheses(&svc).await;
        let scores = BTreeMap::from([
            (h1.id.clone(), AchScore::Supports),
            (h2.id.clone(), AchScore::Supports),
        ]);
        svc.add_ach_evidence(&owner, &analysis.id, "E", None, None, &scores)
            .await
            .unwrap();

        svc.remove_ach_hypothesis(&owner, &analysis.id, &h1.id).await.unwrap();
        let loaded = svc.get_ach_analysis(&analysis.id).await.unwrap();
        assert_eq!(loaded.hypotheses.len(), 1);
        assert_eq!(loaded.evidence[0].hypotheses_scores.len(), 1);
        assert_eq!(loaded.evidence[0].score_for(&h2.id), Some(AchScore::Supports));
    }

    #[tokio::test]
    async fn update_evidence_keeps_scores() {
        let svc = test_service().await;
        let (owner, analysis, h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let scores = BTreeMap::from([(h1.id.clone(), AchScore::Contradicts)]);
        let evidence = svc
            .add_ach_evidence(&owner, &analysis.id, "Old text", Some("src"), None, &scores)
            .await
            .unwrap();

        let updated = svc
            .update_ach_evidence(
                &owner,
                &analysis.id,
                &evidence.id,
                EvidenceUpdate {
                    text: Some("New text".into()),
                    source: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.text, "New text");
        assert_eq!(updated.source, None);
        assert_eq!(updated.score_for(&h1.id), Some(AchScore::Contradicts));
    }

    #[tokio::test]
    async fn update_evidence_of_other_analysis_is_no_result() {
        let svc = test_service().await;
        let (owner, analysis, _h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let (_, other, _, _) = analysis_with_two_hypotheses(&svc).await;
        let evidence = svc
            .add_ach_evidence(&owner, &analysis.id, "Mine", None, None, &BTreeMap::new())
            .await
            .unwrap();

        let err = svc
            .update_ach_evidence(
                &owner,
                &other.id,
                &evidence.id,
                EvidenceUpdate {
                    text: Some("Hijack".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }

    #[tokio::test]
    async fn list_reports_child_counts() {
        let svc = test_service().await;
        let (owner, analysis, h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let scores = BTreeMap::from([(h1.id.clone(), AchScore::Supports)]);
        svc.add_ach_evidence(&owner, &analysis.id, "E", None, None, &scores)
            .await
            .unwrap();

        let summaries = svc.list_ach_analyses(&analysis.workspace_id, 10).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].hypothesis_count, 2);
        assert_eq!(summaries[0].evidence_count, 1);
    }

    #[tokio::test]
    async fn transition_and_delete() {
        let svc = test_service().await;
        let (owner, analysis, _h1, _h2) = analysis_with_two_hypotheses(&svc).await;

        let archived = svc
            .transition_ach_analysis(&owner, &analysis.id, AnalysisStatus::Archived)
            .await
            .unwrap();
        assert_eq!(archived.status, AnalysisStatus::Archived);
        assert!(matches!(
            svc.transition_ach_analysis(&owner, &analysis.id, AnalysisStatus::InProgress)
                .await,
            Err(DatabaseError::InvalidState(_))
        ));

        svc.delete_ach_analysis(&owner, &analysis.id).await.unwrap();
        assert!(matches!(
            svc.get_ach_analysis(&analysis.id).await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn update_analysis_changes_scale() {
        let svc = test_service().await;
        let (owner, analysis, _h1, _h2) = analysis_with_two_hypotheses(&svc).await;
        let updated = svc
            .update_ach_analysis(
                &owner,
                &analysis.id,
                AchAnalysisUpdate {
                    scale_type: Some(AchScaleType::Linear),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.scale_type, AchScaleType::Linear);
        assert_eq!(updated.hypotheses.len(), 2);
    }
}
