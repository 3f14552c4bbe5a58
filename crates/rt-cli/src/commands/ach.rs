use std::path::Path;

use anyhow::Context;
use rt_analysis::ach::{
    AchMatrix, HypothesisScore, build_matrix, off_scale_weight, rank_by_weighted_score,
    rank_hypotheses, score_matrix,
};
use rt_config::ResearchConfig;
use rt_core::entities::{Evidence, Hypothesis};
use rt_core::enums::AchScaleType;
use serde::{Deserialize, Serialize};

use crate::cli::{AchCommands, GlobalFlags};
use crate::commands::open_service;
use crate::output::{TableView, Terminal, output, ranking_table};

/// Hypotheses and evidence as exported from an analysis.
///
/// A full `AchAnalysis` document parses too; its other fields are ignored.
#[derive(Debug, Deserialize)]
struct AchFile {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    scale_type: AchScaleType,
    #[serde(default)]
    hypotheses: Vec<Hypothesis>,
    #[serde(default)]
    evidence: Vec<Evidence>,
}

#[derive(Debug, Serialize)]
struct ScoreReport {
    title: Option<String>,
    ranking: Vec<HypothesisScore>,
    weighted_ranking: Vec<HypothesisScore>,
    matrix: AchMatrix,
}

impl ScoreReport {
    fn new(title: Option<String>, hypotheses: &[Hypothesis], evidence: &[Evidence]) -> Self {
        let scores = score_matrix(hypotheses, evidence);
        Self {
            title,
            ranking: rank_hypotheses(&scores),
            weighted_ranking: rank_by_weighted_score(&scores),
            matrix: build_matrix(hypotheses, evidence),
        }
    }
}

impl TableView for ScoreReport {
    fn table(&self, term: Terminal) -> String {
        let heading = self.title.as_deref().unwrap_or("ACH analysis");
        format!(
            "{}\n\n{}",
            ranking_table(&format!("{heading}: fewest contradictions"), &self.ranking, term),
            ranking_table(&format!("{heading}: weighted score"), &self.weighted_ranking, term),
        )
    }
}

/// Handle `rtools ach`.
pub async fn handle(
    action: &AchCommands,
    config: &ResearchConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let report = match action {
        AchCommands::Score { file } => {
            let parsed = read_file(file)?;
            ScoreReport::new(parsed.title, &parsed.hypotheses, &parsed.evidence)
        }
        AchCommands::Show { id } => {
            let service = open_service(config).await?;
            let analysis = service.get_ach_analysis(id).await?;
            ScoreReport::new(Some(analysis.title), &analysis.hypotheses, &analysis.evidence)
        }
    };
    output(&report, flags.format)
}

fn read_file(path: &Path) -> anyhow::Result<AchFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: AchFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not an ACH export", path.display()))?;
    if let Some((evidence_id, weight)) = off_scale_weight(parsed.scale_type, &parsed.evidence) {
        anyhow::bail!(
            "evidence {evidence_id} has weight {weight}, which is not on the {} scale",
            parsed.scale_type
        );
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::{ScoreReport, read_file};
    use crate::output::{TableView, Terminal};

    #[test]
    fn exported_file_is_ranked_by_inconsistency() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "title": "Pipeline outage",
                "hypotheses": [
                    {{"id": "hyp-a", "text": "Sabotage"}},
                    {{"id": "hyp-b", "text": "Equipment failure"}}
                ],
                "evidence": [
                    {{"id": "evd-1", "text": "Explosive residue",
                      "hypotheses_scores": {{"hyp-a": "supports", "hyp-b": "contradicts"}}}},
                    {{"id": "evd-2", "text": "Maintenance overdue",
                      "hypotheses_scores": {{"hyp-b": "supports", "hyp-c": "bogus"}}}}
                ]
            }}"#
        )
        .expect("write");

        let parsed = read_file(file.path()).expect("file should parse");
        let report = ScoreReport::new(parsed.title, &parsed.hypotheses, &parsed.evidence);

        assert_eq!(report.title.as_deref(), Some("Pipeline outage"));
        let order: Vec<&str> = report
            .ranking
            .iter()
            .map(|score| score.hypothesis_id.as_str())
            .collect();
        assert_eq!(order, vec!["hyp-a", "hyp-b"]);
        assert_eq!(report.matrix.rows[0].cells, vec!["+", "-"]);
        assert_eq!(report.matrix.rows[1].cells, vec!["", "+"]);

        let table = report.table(Terminal::default());
        assert!(table.starts_with("Pipeline outage: fewest contradictions\n#  HYPOTHESIS"));
        assert!(table.contains("Pipeline outage: weighted score"));
    }

    #[test]
    fn weights_follow_the_declared_scale() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "scale_type": "linear",
                "hypotheses": [{{"id": "hyp-a", "text": "Sabotage"}}],
                "evidence": [
                    {{"id": "evd-1", "text": "Residue", "weight": 5,
                      "hypotheses_scores": {{"hyp-a": "supports"}}}},
                    {{"id": "evd-2", "text": "Alibi", "weight": 2,
                      "hypotheses_scores": {{"hyp-a": "contradicts"}}}}
                ]
            }}"#
        )
        .expect("write");
        let parsed = read_file(file.path()).expect("linear weights parse");
        let report = ScoreReport::new(None, &parsed.hypotheses, &parsed.evidence);
        assert_eq!(report.weighted_ranking[0].tally.weighted_score, 3);

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"scale_type": "linear", "evidence": [{{"id": "evd-9", "text": "x", "weight": 12}}]}}"#
        )
        .expect("write");
        let err = read_file(file.path()).expect_err("12 is off the linear scale");
        assert!(err.to_string().contains("evd-9"));
    }

    #[test]
    fn non_json_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "hypotheses: []").expect("write");
        let err = read_file(file.path()).expect_err("yaml is rejected");
        assert!(err.to_string().contains("is not an ACH export"));
    }
}
