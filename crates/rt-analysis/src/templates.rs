//! Starter templates for new ACH analyses.

use serde::Serialize;

/// A named starting point: suggested hypotheses and evidence categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchTemplate {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub sample_hypotheses: &'static [&'static str],
    pub evidence_categories: &'static [&'static str],
}

const TEMPLATES: [AchTemplate; 3] = [
    AchTemplate {
        id: 1,
        name: "Attribution Analysis",
        description: "Template for attributing actions to actors",
        sample_hypotheses: &[
            "State-sponsored actor",
            "Criminal organization",
            "Hacktivist group",
            "Insider threat",
        ],
        evidence_categories: &[
            "Technical indicators",
            "Behavioral patterns",
            "Motivations",
            "Capabilities",
        ],
    },
    AchTemplate {
        id: 2,
        name: "Threat Assessment",
        description: "Template for assessing potential threats",
        sample_hypotheses: &[
            "Imminent threat",
            "Developing threat",
            "Low probability threat",
            "No credible threat",
        ],
        evidence_categories: &[
            "Intelligence reports",
            "Open source information",
            "Technical indicators",
            "Historical patterns",
        ],
    },
    AchTemplate {
        id: 3,
        name: "Intent Analysis",
        description: "Template for analyzing adversary intent",
        sample_hypotheses: &[
            "Espionage",
            "Sabotage",
            "Financial gain",
            "Political influence",
        ],
        evidence_categories: &["Target selection", "Methods used", "Timing", "Communications"],
    },
];

#[must_use]
pub fn ach_templates() -> &'static [AchTemplate] {
    &TEMPLATES
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn templates_have_unique_ids_and_content() {
        let templates = ach_templates();
        let ids: Vec<u32> = templates.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(
            templates
                .iter()
                .all(|t| !t.sample_hypotheses.is_empty() && !t.evidence_categories.is_empty())
        );
    }
}
