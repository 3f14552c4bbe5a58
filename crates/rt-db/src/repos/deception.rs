//! Workspace deception risk: load the raw rows and hand them to the
//! aggregator in `rt-analysis`.

use std::collections::BTreeMap;

use rt_analysis::deception::{ContentClaims, DeceptionInputs, DeceptionRiskReport, aggregate_deception_risk};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, get_u32};
use crate::service::ResearchService;

impl ResearchService {
    /// Compute the deception risk report for a workspace.
    ///
    /// Actor profiles, MOSES assessments, and claim documents are passed
    /// through unparsed; the aggregator skips anything it cannot read.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown workspace.
    pub async fn deception_risk(&self, workspace_id: &str) -> Result<DeceptionRiskReport, DatabaseError> {
        self.get_workspace(workspace_id).await?;

        let actors = self.list_actors(workspace_id, None).await?;
        let sources = self.list_sources(workspace_id, None).await?;
        let mut adjustments = self.workspace_adjustments(workspace_id).await?;

        let mut contents = Vec::new();
        let mut rows = self
            .db()
            .query(
                "SELECT id, title, claim_analysis FROM content_analyses
                 WHERE workspace_id = ?1 ORDER BY created_at, id",
                [workspace_id],
            )
            .await?;
        while let Some(row) = rows.next().await? {
            let content_id: String = row.get(0)?;
            let content_adjustments = adjustments.remove(&content_id).unwrap_or_default();
            contents.push(ContentClaims {
                content_id,
                title: get_opt_string(&row, 1)?,
                claim_analysis: get_opt_string(&row, 2)?,
                adjustments: content_adjustments,
            });
        }

        let report = aggregate_deception_risk(&DeceptionInputs {
            actors: &actors,
            sources: &sources,
            contents: &contents,
        });
        tracing::debug!(
            workspace_id,
            overall = report.overall_risk_score,
            level = %report.risk_level,
            skipped = report.skipped,
            "deception risk computed"
        );
        Ok(report)
    }

    /// Adjusted claim scores for every content analysis in the workspace,
    /// keyed by content id and then claim index.
    async fn workspace_adjustments(
        &self,
        workspace_id: &str,
    ) -> Result<BTreeMap<String, BTreeMap<u32, f64>>, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                "SELECT a.content_analysis_id, a.claim_index, a.adjusted_risk_score
                 FROM claim_adjustments a
                 JOIN content_analyses c ON c.id = a.content_analysis_id
                 WHERE c.workspace_id = ?1",
                [workspace_id],
            )
            .await?;
        let mut by_content: BTreeMap<String, BTreeMap<u32, f64>> = BTreeMap::new();
        while let Some(row) = rows.next().await? {
            by_content
                .entry(row.get::<String>(0)?)
                .or_default()
                .insert(get_u32(&row, 1)?, row.get::<f64>(2)?);
        }
        Ok(by_content)
    }
}
