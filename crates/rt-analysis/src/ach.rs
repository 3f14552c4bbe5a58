//! Analysis of Competing Hypotheses scoring.
//!
//! Every evidence item carries an optional qualitative score per hypothesis.
//! A hypothesis is tallied only over evidence that actually scores it; an
//! evidence item with no entry for the hypothesis is ignored entirely.
//!
//! Evidence may also carry a weight on the analysis scale. The weighted
//! score sums `weight * rating` and is reported next to the plain counts;
//! it never changes them.

use rt_core::entities::{Evidence, Hypothesis};
use rt_core::enums::{AchScaleType, AchScore};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Counts of each score kind for one hypothesis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HypothesisTally {
    pub supports: u32,
    pub contradicts: u32,
    pub neutral: u32,
    pub not_applicable: u32,
    /// `supports - contradicts`; may be negative.
    pub net_score: i64,
    /// Sum of `weight * rating` over the scored evidence.
    pub weighted_score: i64,
}

/// Per-bucket percentages of a tally, for the matrix visualization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreProportions {
    pub supports: f64,
    pub contradicts: f64,
    pub neutral: f64,
    pub not_applicable: f64,
}

impl HypothesisTally {
    /// Number of evidence items that scored this hypothesis.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.supports + self.contradicts + self.neutral + self.not_applicable
    }

    /// Each bucket as a percentage of [`total`](Self::total).
    ///
    /// Returns `None` when nothing was scored, so callers never divide by zero.
    #[must_use]
    pub fn proportions(&self) -> Option<ScoreProportions> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let pct = |count: u32| f64::from(count) / f64::from(total) * 100.0;
        Some(ScoreProportions {
            supports: pct(self.supports),
            contradicts: pct(self.contradicts),
            neutral: pct(self.neutral),
            not_applicable: pct(self.not_applicable),
        })
    }

    fn record(&mut self, score: AchScore) {
        match score {
            AchScore::Supports => self.supports += 1,
            AchScore::Contradicts => self.contradicts += 1,
            AchScore::Neutral => self.neutral += 1,
            AchScore::NotApplicable => self.not_applicable += 1,
        }
    }
}

/// Tally every evidence item's score for `hypothesis_id`.
#[must_use]
pub fn score_hypothesis(hypothesis_id: &str, evidence: &[Evidence]) -> HypothesisTally {
    let mut tally = evidence
        .iter()
        .filter_map(|item| item.score_for(hypothesis_id).map(|score| (item, score)))
        .fold(HypothesisTally::default(), |mut tally, (item, score)| {
            tally.record(score);
            tally.weighted_score += i64::from(item.effective_weight()) * score.rating();
            tally
        });
    tally.net_score = i64::from(tally.supports) - i64::from(tally.contradicts);
    tally
}

/// A hypothesis together with its tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HypothesisScore {
    pub hypothesis_id: String,
    pub text: String,
    #[serde(flatten)]
    pub tally: HypothesisTally,
}

/// Tally every hypothesis, preserving the analysis order.
#[must_use]
pub fn score_matrix(hypotheses: &[Hypothesis], evidence: &[Evidence]) -> Vec<HypothesisScore> {
    hypotheses
        .iter()
        .map(|h| HypothesisScore {
            hypothesis_id: h.id.clone(),
            text: h.text.clone(),
            tally: score_hypothesis(&h.id, evidence),
        })
        .collect()
}

/// Order hypotheses from most to least likely.
///
/// ACH favours the hypothesis with the least inconsistent evidence, so the
/// primary key is ascending `contradicts`. Ties fall back to descending
/// `net_score` and then to the input order (the sort is stable).
#[must_use]
pub fn rank_hypotheses(scores: &[HypothesisScore]) -> Vec<HypothesisScore> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| {
        a.tally
            .contradicts
            .cmp(&b.tally.contradicts)
            .then_with(|| b.tally.net_score.cmp(&a.tally.net_score))
    });
    ranked
}

/// Order hypotheses by descending weighted score, keeping input order on ties.
#[must_use]
pub fn rank_by_weighted_score(scores: &[HypothesisScore]) -> Vec<HypothesisScore> {
    let mut ranked = scores.to_vec();
    ranked.sort_by(|a, b| b.tally.weighted_score.cmp(&a.tally.weighted_score));
    ranked
}

/// First evidence item whose weight is not on `scale`, as `(id, weight)`.
#[must_use]
pub fn off_scale_weight(scale: AchScaleType, evidence: &[Evidence]) -> Option<(&str, u8)> {
    evidence.iter().find_map(|item| {
        item.weight
            .filter(|weight| !scale.accepts_weight(*weight))
            .map(|weight| (item.id.as_str(), weight))
    })
}

/// Printable evidence-by-hypothesis grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AchMatrix {
    /// Hypothesis texts, in column order.
    pub header: Vec<String>,
    pub rows: Vec<AchMatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AchMatrixRow {
    pub evidence_id: String,
    pub evidence: String,
    /// One symbol per header column; empty when the cell is unscored.
    pub cells: Vec<String>,
}

/// Build the display grid: `+`, `-`, `0`, `NA`, or an empty cell.
#[must_use]
pub fn build_matrix(hypotheses: &[Hypothesis], evidence: &[Evidence]) -> AchMatrix {
    let header = hypotheses.iter().map(|h| h.text.clone()).collect();
    let rows = evidence
        .iter()
        .map(|item| AchMatrixRow {
            evidence_id: item.id.clone(),
            evidence: item.text.clone(),
            cells: hypotheses
                .iter()
                .map(|h| {
                    item.score_for(&h.id)
                        .map_or_else(String::new, |s| s.symbol().to_string())
                })
                .collect(),
        })
        .collect();
    AchMatrix { header, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn hyp(id: &str) -> Hypothesis {
        Hypothesis {
            id: id.into(),
            text: format!("Hypothesis {id}"),
        }
    }

    fn ev(id: &str, scores: &[(&str, AchScore)]) -> Evidence {
        Evidence {
            id: id.into(),
            text: format!("Evidence {id}"),
            source: None,
            weight: None,
            hypotheses_scores: scores
                .iter()
                .map(|(h, s)| ((*h).to_string(), *s))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn two_hypothesis_scenario() {
        let evidence = vec![
            ev(
                "E1",
                &[("H1", AchScore::Supports), ("H2", AchScore::Contradicts)],
            ),
            ev("E2", &[("H1", AchScore::Neutral)]),
        ];

        let h1 = score_hypothesis("H1", &evidence);
        assert_eq!(
            h1,
            HypothesisTally {
                supports: 1,
                contradicts: 0,
                neutral: 1,
                not_applicable: 0,
                net_score: 1,
                weighted_score: 1,
            }
        );

        let h2 = score_hypothesis("H2", &evidence);
        assert_eq!(
            h2,
            HypothesisTally {
                supports: 0,
                contradicts: 1,
                neutral: 0,
                not_applicable: 0,
                net_score: -1,
                weighted_score: -1,
            }
        );
    }

    #[test]
    fn empty_evidence_is_all_zero() {
        let tally = score_hypothesis("H1", &[]);
        assert_eq!(tally, HypothesisTally::default());
        assert_eq!(tally.net_score, 0);
        assert_eq!(tally.proportions(), None);
    }

    #[test]
    fn total_counts_only_scored_evidence() {
        let evidence = vec![
            ev("E1", &[("H1", AchScore::Supports)]),
            ev("E2", &[("H2", AchScore::Supports)]),
            ev("E3", &[("H1", AchScore::NotApplicable)]),
            ev("E4", &[]),
            ev("E5", &[("H1", AchScore::Contradicts)]),
        ];
        let scored = evidence.iter().filter(|e| e.score_for("H1").is_some()).count();
        let tally = score_hypothesis("H1", &evidence);
        assert_eq!(tally.total() as usize, scored);
        assert_eq!(tally.total(), 3);
    }

    #[rstest]
    #[case(3, 0, 3)]
    #[case(0, 4, -4)]
    #[case(2, 2, 0)]
    fn net_score_is_supports_minus_contradicts(
        #[case] supports: usize,
        #[case] contradicts: usize,
        #[case] expected: i64,
    ) {
        let mut evidence = Vec::new();
        for i in 0..supports {
            evidence.push(ev(&format!("S{i}"), &[("H", AchScore::Supports)]));
        }
        for i in 0..contradicts {
            evidence.push(ev(&format!("C{i}"), &[("H", AchScore::Contradicts)]));
        }
        evidence.push(ev("N", &[("H", AchScore::Neutral)]));
        assert_eq!(score_hypothesis("H", &evidence).net_score, expected);
    }

    #[test]
    fn proportions_are_percentages() {
        let evidence = vec![
            ev("E1", &[("H", AchScore::Supports)]),
            ev("E2", &[("H", AchScore::Supports)]),
            ev("E3", &[("H", AchScore::Contradicts)]),
            ev("E4", &[("H", AchScore::Neutral)]),
        ];
        let p = score_hypothesis("H", &evidence).proportions().unwrap();
        assert!((p.supports - 50.0).abs() < f64::EPSILON);
        assert!((p.contradicts - 25.0).abs() < f64::EPSILON);
        assert!((p.neutral - 25.0).abs() < f64::EPSILON);
        assert!(p.not_applicable.abs() < f64::EPSILON);
    }

    #[test]
    fn ranking_prefers_fewest_contradictions() {
        let hypotheses = vec![hyp("A"), hyp("B"), hyp("C")];
        let evidence = vec![
            ev(
                "E1",
                &[
                    ("A", AchScore::Supports),
                    ("B", AchScore::Contradicts),
                    ("C", AchScore::Supports),
                ],
            ),
            ev(
                "E2",
                &[
                    ("A", AchScore::Contradicts),
                    ("B", AchScore::Contradicts),
                    ("C", AchScore::Supports),
                ],
            ),
            ev("E3", &[("A", AchScore::Supports)]),
        ];
        let ranked = rank_hypotheses(&score_matrix(&hypotheses, &evidence));
        let order: Vec<_> = ranked.iter().map(|s| s.hypothesis_id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }

    #[test]
    fn ranking_is_stable_on_ties() {
        let hypotheses = vec![hyp("X"), hyp("Y")];
        let ranked = rank_hypotheses(&score_matrix(&hypotheses, &[]));
        assert_eq!(ranked[0].hypothesis_id, "X");
        assert_eq!(ranked[1].hypothesis_id, "Y");
    }

    fn weighted(id: &str, weight: u8, scores: &[(&str, AchScore)]) -> Evidence {
        Evidence {
            weight: Some(weight),
            ..ev(id, scores)
        }
    }

    #[test]
    fn weights_scale_the_rating() {
        let evidence = vec![
            weighted("E1", 12, &[("H", AchScore::Supports)]),
            weighted("E2", 3, &[("H", AchScore::Contradicts)]),
            weighted("E3", 8, &[("H", AchScore::Neutral)]),
            ev("E4", &[("H", AchScore::Supports)]),
        ];
        let tally = score_hypothesis("H", &evidence);
        assert_eq!(tally.weighted_score, 12 - 3 + 1);
        assert_eq!(tally.net_score, 1);
        assert_eq!(tally.total(), 4);
    }

    #[test]
    fn weighted_ranking_can_differ_from_inconsistency_ranking() {
        let hypotheses = vec![hyp("A"), hyp("B")];
        // A has one light contradiction but strong support; B is never
        // contradicted but only weakly supported.
        let evidence = vec![
            weighted("E1", 12, &[("A", AchScore::Supports), ("B", AchScore::Neutral)]),
            weighted("E2", 1, &[("A", AchScore::Contradicts), ("B", AchScore::Supports)]),
        ];
        let scores = score_matrix(&hypotheses, &evidence);

        let by_weight = rank_by_weighted_score(&scores);
        assert_eq!(by_weight[0].hypothesis_id, "A");
        assert_eq!(by_weight[0].tally.weighted_score, 11);

        let by_inconsistency = rank_hypotheses(&scores);
        assert_eq!(by_inconsistency[0].hypothesis_id, "B");
    }

    #[rstest]
    #[case(AchScaleType::Logarithmic, 8, None)]
    #[case(AchScaleType::Logarithmic, 4, Some(("E2", 4)))]
    #[case(AchScaleType::Linear, 5, None)]
    #[case(AchScaleType::Linear, 12, Some(("E2", 12)))]
    fn weights_are_checked_against_the_scale(
        #[case] scale: AchScaleType,
        #[case] weight: u8,
        #[case] expected: Option<(&str, u8)>,
    ) {
        let evidence = vec![ev("E1", &[]), weighted("E2", weight, &[])];
        assert_eq!(off_scale_weight(scale, &evidence), expected);
    }

    #[test]
    fn matrix_uses_symbols_and_blank_cells() {
        let hypotheses = vec![hyp("H1"), hyp("H2")];
        let evidence = vec![
            ev(
                "E1",
                &[("H1", AchScore::Supports), ("H2", AchScore::NotApplicable)],
            ),
            ev("E2", &[("H2", AchScore::Contradicts)]),
            ev("E3", &[("H1", AchScore::Neutral)]),
        ];
        let matrix = build_matrix(&hypotheses, &evidence);
        assert_eq!(matrix.header, vec!["Hypothesis H1", "Hypothesis H2"]);
        let cells: Vec<Vec<String>> = matrix.rows.into_iter().map(|r| r.cells).collect();
        assert_eq!(
            cells,
            vec![
                vec!["+".to_string(), "NA".to_string()],
                vec![String::new(), "-".to_string()],
                vec!["0".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn score_serializes_flat() {
        let scores = score_matrix(&[hyp("H1")], &[ev("E1", &[("H1", AchScore::Supports)])]);
        let json = serde_json::to_value(&scores[0]).unwrap();
        assert_eq!(json["supports"], 1);
        assert_eq!(json["net_score"], 1);
        assert_eq!(json["weighted_score"], 1);
        assert_eq!(json["hypothesis_id"], "H1");
    }
}
