use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Four-way category of a candidate, from its filter verdict and database presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Allowed by the filter and known to the database.
    Standard,
    /// Allowed by the filter but absent from the database.
    Missing,
    /// Rejected by the filter yet present in the database.
    Interesting,
    /// Rejected by the filter and absent from the database.
    Unlikely,
}

impl Label {
    pub const ALL: [Label; 4] = [
        Label::Standard,
        Label::Missing,
        Label::Interesting,
        Label::Unlikely,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Standard => "standard",
            Label::Missing => "missing",
            Label::Interesting => "interesting",
            Label::Unlikely => "unlikely",
        }
    }
}

/// The labelling rule. Total over all four inputs.
pub fn label(smact_allowed: bool, in_database: bool) -> Label {
    match (smact_allowed, in_database) {
        (true, true) => Label::Standard,
        (true, false) => Label::Missing,
        (false, true) => Label::Interesting,
        (false, false) => Label::Unlikely,
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown label '{0}' (expected standard, missing, interesting or unlikely)")]
pub struct ParseLabelError(pub String);

impl FromStr for Label {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Label::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

/// One row of the candidate table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub formula: String,
    pub smact_allowed: bool,
}

/// One row of the labelled table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledRecord {
    pub formula: String,
    pub smact_allowed: bool,
    pub in_database: bool,
    pub label: Label,
}

/// Joins candidates against the set of formulas known to the database.
///
/// Both sides must already use canonical reduced formulas. A candidate without a match is
/// simply not in the database.
pub fn classify(
    candidates: &[CandidateRecord],
    database_formulas: &HashSet<String>,
) -> Vec<LabelledRecord> {
    candidates
        .iter()
        .map(|c| {
            let in_database = database_formulas.contains(&c.formula);
            LabelledRecord {
                formula: c.formula.clone(),
                smact_allowed: c.smact_allowed,
                in_database,
                label: label(c.smact_allowed, in_database),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSummary {
    pub standard: usize,
    pub missing: usize,
    pub interesting: usize,
    pub unlikely: usize,
}

impl LabelSummary {
    pub fn from_records(records: &[LabelledRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            *summary.count_mut(record.label) += 1;
        }
        summary
    }

    pub fn count(&self, label: Label) -> usize {
        match label {
            Label::Standard => self.standard,
            Label::Missing => self.missing,
            Label::Interesting => self.interesting,
            Label::Unlikely => self.unlikely,
        }
    }

    fn count_mut(&mut self, label: Label) -> &mut usize {
        match label {
            Label::Standard => &mut self.standard,
            Label::Missing => &mut self.missing,
            Label::Interesting => &mut self.interesting,
            Label::Unlikely => &mut self.unlikely,
        }
    }

    pub fn total(&self) -> usize {
        self.standard + self.missing + self.interesting + self.unlikely
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_covers_all_four_input_pairs() {
        assert_eq!(label(true, true), Label::Standard);
        assert_eq!(label(true, false), Label::Missing);
        assert_eq!(label(false, true), Label::Interesting);
        assert_eq!(label(false, false), Label::Unlikely);

        let produced: HashSet<Label> = [(true, true), (true, false), (false, true), (false, false)]
            .into_iter()
            .map(|(a, b)| label(a, b))
            .collect();
        assert_eq!(produced.len(), 4);
    }

    #[test]
    fn label_names_round_trip() {
        for l in Label::ALL {
            assert_eq!(l.to_string().parse::<Label>().unwrap(), l);
        }
        assert_eq!("Standard".parse::<Label>().unwrap(), Label::Standard);
        assert_eq!(
            "probable".parse::<Label>(),
            Err(ParseLabelError("probable".to_string()))
        );
    }

    #[test]
    fn classify_defaults_missing_lookups_to_not_in_database() {
        let candidates = vec![
            CandidateRecord {
                formula: "NaCl".into(),
                smact_allowed: true,
            },
            CandidateRecord {
                formula: "LiCl".into(),
                smact_allowed: true,
            },
            CandidateRecord {
                formula: "NaCl2".into(),
                smact_allowed: false,
            },
            CandidateRecord {
                formula: "Na3Cl".into(),
                smact_allowed: false,
            },
        ];
        let database: HashSet<String> = ["NaCl", "Na3Cl", "KBr"]
            .into_iter()
            .map(String::from)
            .collect();

        let labelled = classify(&candidates, &database);
        let labels: Vec<Label> = labelled.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                Label::Standard,
                Label::Missing,
                Label::Unlikely,
                Label::Interesting
            ]
        );
        assert!(!labelled[1].in_database);

        let summary = LabelSummary::from_records(&labelled);
        assert_eq!(summary.total(), 4);
        assert!(Label::ALL.iter().all(|&l| summary.count(l) == 1));
    }

    #[test]
    fn classify_with_empty_database_never_fails() {
        let candidates = vec![CandidateRecord {
            formula: "CsPbI3".into(),
            smact_allowed: true,
        }];
        let labelled = classify(&candidates, &HashSet::new());
        assert_eq!(labelled[0].label, Label::Missing);
    }

    #[test]
    fn label_serializes_lowercase() {
        let json = serde_json::to_string(&Label::Interesting).unwrap();
        assert_eq!(json, "\"interesting\"");
    }
}
