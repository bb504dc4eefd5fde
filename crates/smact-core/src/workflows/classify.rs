use crate::core::chemistry::composition::Composition;
use crate::core::io::records::{database_formulas, read_records_dir};
use crate::core::io::table::read_table;
use crate::engine::error::EngineError;
use crate::engine::labeling::{self, CandidateRecord, LabelSummary, LabelledRecord};
use crate::engine::progress::ProgressReporter;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub records: Vec<LabelledRecord>,
    pub summary: LabelSummary,
}

/// Labels the candidates in `candidates_path` against the records stored in `records_dir`.
///
/// Candidate formulas are canonicalised first, so `Cs1Pb1I3` joins with a record for
/// `CsPbI3`. A missing record directory is an error, while an empty one simply labels
/// every candidate as absent from the database.
#[instrument(skip_all, name = "classification_workflow")]
pub fn run(
    candidates_path: &Path,
    records_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<ClassificationResult, EngineError> {
    let (candidates, known) = reporter.phase("Loading Inputs", || {
        let candidates: Vec<CandidateRecord> = read_table(candidates_path)?;
        let records = read_records_dir(records_dir)?;
        let known = database_formulas(&records);
        info!(
            num_candidates = candidates.len(),
            num_records = records.len(),
            num_formulas = known.len(),
            "Inputs loaded."
        );
        Ok::<_, EngineError>((candidates, known))
    })?;

    let labelled = reporter.phase("Labelling", || {
        canonicalize(candidates).map(|c| labeling::classify(&c, &known))
    })?;
    let summary = LabelSummary::from_records(&labelled);

    info!(
        standard = summary.standard,
        missing = summary.missing,
        interesting = summary.interesting,
        unlikely = summary.unlikely,
        "Classification complete."
    );
    Ok(ClassificationResult {
        records: labelled,
        summary,
    })
}

fn canonicalize(candidates: Vec<CandidateRecord>) -> Result<Vec<CandidateRecord>, EngineError> {
    candidates
        .into_iter()
        .map(|mut candidate| {
            let canonical = candidate.formula.parse::<Composition>()?.reduced_formula();
            if canonical != candidate.formula {
                debug!(from = %candidate.formula, to = %canonical, "Canonicalised formula.");
                candidate.formula = canonical;
            }
            Ok(candidate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::records::{MaterialRecord, write_record};
    use crate::engine::labeling::Label;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classification_joins_on_canonical_formulas() {
        let dir = tempdir().unwrap();
        let candidates = dir.path().join("candidates.csv");
        fs::write(
            &candidates,
            "formula,smact_allowed\nCs1Pb1I3,true\nNaCl,true\nNaCl2,false\nNa2Cl6,false\n",
        )
        .unwrap();
        let records_dir = dir.path().join("records");
        fs::create_dir(&records_dir).unwrap();
        write_record(&records_dir, &MaterialRecord::new("mp-1", "CsPbI3")).unwrap();
        write_record(&records_dir, &MaterialRecord::new("mp-2", "Na2Cl6")).unwrap();

        let result = run(&candidates, &records_dir, &ProgressReporter::new()).unwrap();
        let labels: Vec<(&str, Label)> = result
            .records
            .iter()
            .map(|r| (r.formula.as_str(), r.label))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("CsPbI3", Label::Standard),
                ("NaCl", Label::Missing),
                ("NaCl2", Label::Unlikely),
                ("NaCl3", Label::Interesting),
            ]
        );
        assert!(Label::ALL.iter().all(|&l| result.summary.count(l) == 1));
    }

    #[test]
    fn empty_record_directory_labels_everything_absent() {
        let dir = tempdir().unwrap();
        let candidates = dir.path().join("candidates.csv");
        fs::write(&candidates, "formula,smact_allowed\nLiF,true\nLiF2,false\n").unwrap();

        let result = run(&candidates, dir.path(), &ProgressReporter::new()).unwrap();
        assert_eq!(result.summary.missing, 1);
        assert_eq!(result.summary.unlikely, 1);
        assert!(result.records.iter().all(|r| !r.in_database));
    }

    #[test]
    fn unparsable_candidate_formula_is_an_error() {
        let dir = tempdir().unwrap();
        let candidates = dir.path().join("candidates.csv");
        fs::write(&candidates, "formula,smact_allowed\nXyz9,true\n").unwrap();
        assert!(matches!(
            run(&candidates, dir.path(), &ProgressReporter::new()),
            Err(EngineError::Composition { .. })
        ));
    }
}
