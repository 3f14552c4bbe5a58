use std::fmt::Write as _;
use std::io::IsTerminal;

use rt_analysis::ach::HypothesisScore;
use rt_analysis::deception::{AlertSeverity, CategorySummary, DeceptionRiskReport};
use rt_core::responses::{CleanupResponse, RegisterResponse};
use serde::Serialize;

use crate::cli::OutputFormat;

pub mod table;

use table::{Align, Table, paint_level};

/// Terminal settings for `--format table`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Terminal {
    pub width: Option<usize>,
    pub color: bool,
}

impl Terminal {
    /// Color only for an interactive stdout without `NO_COLOR`; clamp to `COLUMNS`.
    fn detect() -> Self {
        Self {
            width: std::env::var("COLUMNS")
                .ok()
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|width| *width >= 40),
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }
}

/// Human-readable rendering of a command result.
pub trait TableView {
    fn table(&self, term: Terminal) -> String;
}

pub fn render<T: Serialize + TableView>(
    value: &T,
    format: OutputFormat,
    term: Terminal,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(value.table(term)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a command result in the requested format.
pub fn output<T: Serialize + TableView>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format, Terminal::detect())?;
    println!("{rendered}");
    Ok(())
}

/// Ranking table shared by `ach score` and `ach show`.
pub fn ranking_table(title: &str, scores: &[HypothesisScore], term: Terminal) -> String {
    let mut table = Table::new(&[
        ("#", Align::Right),
        ("HYPOTHESIS", Align::Left),
        ("CONTRA", Align::Right),
        ("SUPPORT", Align::Right),
        ("NET", Align::Right),
        ("WEIGHTED", Align::Right),
    ]);
    for (rank, score) in scores.iter().enumerate() {
        table.row(vec![
            (rank + 1).to_string(),
            score.text.clone(),
            score.tally.contradicts.to_string(),
            score.tally.supports.to_string(),
            score.tally.net_score.to_string(),
            score.tally.weighted_score.to_string(),
        ]);
    }
    format!("{title}\n{}", table.render(term.width))
}

fn summary_row(name: &str, summary: &CategorySummary) -> Vec<String> {
    vec![
        name.to_string(),
        format!("{:.2}", summary.average),
        summary.count.to_string(),
        summary.high.to_string(),
        summary.medium.to_string(),
        summary.low.to_string(),
    ]
}

const fn severity_label(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::High => "HIGH",
        AlertSeverity::Critical => "CRITICAL",
    }
}

impl TableView for DeceptionRiskReport {
    fn table(&self, term: Terminal) -> String {
        let mut out = format!(
            "Overall risk {} ({})",
            self.overall_risk_score,
            paint_level(self.risk_level.as_str(), term.color)
        );
        if self.skipped > 0 {
            let _ = write!(out, ", {} unreadable entries skipped", self.skipped);
        }

        let mut categories = Table::new(&[
            ("CATEGORY", Align::Left),
            ("AVG", Align::Right),
            ("COUNT", Align::Right),
            ("HIGH", Align::Right),
            ("MEDIUM", Align::Right),
            ("LOW", Align::Right),
        ]);
        categories.row(summary_row("MOM", &self.mom));
        categories.row(summary_row("POP", &self.pop));
        categories.row(summary_row("CLAIMS", &self.claims));
        categories.row(vec![
            "MOSES".into(),
            format!("{:.2}", self.moses.average),
            self.moses.count.to_string(),
            self.moses.compromised.to_string(),
            self.moses.unreliable.to_string(),
            self.moses.solid.to_string(),
        ]);
        out.push_str("\n\n");
        out.push_str(&categories.render(term.width));

        let mut alerts = Table::new(&[
            ("SEVERITY", Align::Left),
            ("CATEGORY", Align::Left),
            ("SCORE", Align::Right),
            ("ENTITY", Align::Left),
        ])
        .with_levels(0, term.color);
        for alert in &self.alerts {
            let entity = match alert.claim_index {
                Some(index) => format!("{} (claim {index})", alert.entity_name),
                None => alert.entity_name.clone(),
            };
            alerts.row(vec![
                severity_label(alert.severity).into(),
                alert.category.as_str().into(),
                format!("{:.1}", alert.score),
                entity,
            ]);
        }
        out.push_str("\n\n");
        if alerts.is_empty() {
            out.push_str("No alerts.");
        } else {
            out.push_str(&alerts.render(term.width));
        }
        out
    }
}

impl TableView for RegisterResponse {
    fn table(&self, _term: Terminal) -> String {
        format!("Account hash: {}\n{}", self.account_hash, self.warning)
    }
}

impl TableView for CleanupResponse {
    fn table(&self, _term: Terminal) -> String {
        format!(
            "Deleted {} unsaved content analyses older than {} days.",
            self.deleted, self.retention_days
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rt_analysis::ach::{HypothesisScore, HypothesisTally};
    use rt_analysis::deception::{
        AlertSeverity, CategorySummary, DeceptionRiskReport, EveSummary, MosesSummary, RiskAlert,
        RiskCategory, RiskLevel,
    };
    use rt_core::responses::CleanupResponse;

    use super::{Terminal, TableView, ranking_table, render};
    use crate::cli::OutputFormat;

    fn report(alerts: Vec<RiskAlert>) -> DeceptionRiskReport {
        DeceptionRiskReport {
            overall_risk_score: 68,
            risk_level: RiskLevel::High,
            mom: CategorySummary {
                average: 3.5,
                count: 2,
                high: 1,
                medium: 1,
                low: 0,
            },
            pop: CategorySummary::default(),
            eve: EveSummary::default(),
            moses: MosesSummary {
                average: 2.0,
                count: 1,
                compromised: 0,
                unreliable: 1,
                solid: 0,
            },
            claims: CategorySummary::default(),
            alerts,
            skipped: 0,
        }
    }

    #[test]
    fn risk_report_lists_categories_and_alerts() {
        let out = report(vec![RiskAlert {
            severity: AlertSeverity::Critical,
            category: RiskCategory::Mom,
            entity_id: "act-1".into(),
            entity_name: "Ivan Petrov".into(),
            claim_index: None,
            score: 4.5,
            message: "High MOM".into(),
        }])
        .table(Terminal::default());

        assert!(out.starts_with("Overall risk 68 (HIGH)"));
        let mom = out
            .lines()
            .find(|line| line.starts_with("MOM"))
            .expect("MOM row");
        assert_eq!(mom, "MOM       3.50      2     1       1    0");
        assert!(out.contains("CRITICAL  MOM         4.5  Ivan Petrov"));
    }

    #[test]
    fn risk_report_without_alerts_says_so() {
        let out = report(Vec::new()).table(Terminal::default());
        assert!(out.ends_with("No alerts."));
    }

    #[test]
    fn ranking_shows_weighted_column() {
        let scores = vec![HypothesisScore {
            hypothesis_id: "hyp-a".into(),
            text: "Insider leak".into(),
            tally: HypothesisTally {
                supports: 1,
                contradicts: 1,
                net_score: 0,
                weighted_score: 11,
                ..HypothesisTally::default()
            },
        }];
        let out = ranking_table("By weight", &scores, Terminal::default());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "By weight");
        assert_eq!(lines[1], "#  HYPOTHESIS    CONTRA  SUPPORT  NET  WEIGHTED");
        assert_eq!(lines[3], "1  Insider leak       1        1    0        11");
    }

    #[test]
    fn json_and_raw_keep_the_serialized_shape() {
        let value = CleanupResponse {
            deleted: 3,
            retention_days: 30,
        };
        let pretty = render(&value, OutputFormat::Json, Terminal::default()).expect("json");
        let raw = render(&value, OutputFormat::Raw, Terminal::default()).expect("raw");
        assert_eq!(raw, r#"{"deleted":3,"retention_days":30}"#);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&pretty).expect("parse"),
            serde_json::from_str::<serde_json::Value>(&raw).expect("parse")
        );
        let table = render(&value, OutputFormat::Table, Terminal::default()).expect("table");
        assert_eq!(table, "Deleted 3 unsaved content analyses older than 30 days.");
    }
}
