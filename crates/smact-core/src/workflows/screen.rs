use crate::engine::config::GenerationConfig;
use crate::engine::error::EngineError;
use crate::engine::filter::{ElementOverrides, SmactFilter};
use crate::engine::generation;
use crate::engine::labeling::CandidateRecord;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct ScreeningResult {
    pub candidates: Vec<CandidateRecord>,
}

impl ScreeningResult {
    pub fn num_allowed(&self) -> usize {
        self.candidates.iter().filter(|c| c.smact_allowed).count()
    }
}

/// Builds the SMACT filter described by `config` and runs it over every candidate.
#[instrument(skip_all, name = "screening_workflow")]
pub fn run(
    config: &GenerationConfig,
    reporter: &ProgressReporter,
) -> Result<ScreeningResult, EngineError> {
    let filter = reporter.phase("Preparing Filter", || build_filter(config))?;
    let candidates = reporter.phase("Generating Candidates", || {
        generation::generate(config, &filter, reporter)
    })?;

    let result = ScreeningResult { candidates };
    info!(
        total = result.candidates.len(),
        allowed = result.num_allowed(),
        "Screening complete."
    );
    Ok(result)
}

fn build_filter(config: &GenerationConfig) -> Result<SmactFilter, EngineError> {
    let filter = SmactFilter::new(config.use_electronegativity);
    match &config.element_data {
        Some(path) => {
            info!(path = %path.display(), "Applying element data overrides.");
            Ok(filter.with_overrides(ElementOverrides::from_file(path)?))
        }
        None => Ok(filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GenerationConfigBuilder;
    use crate::engine::progress::Progress;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[test]
    fn screening_counts_allowed_candidates() {
        let config = GenerationConfigBuilder::new()
            .elements(&["Li", "Na", "O", "Cl"])
            .arity(2)
            .max_stoichiometry(2)
            .build()
            .unwrap();
        let result = run(&config, &ProgressReporter::new()).unwrap();
        assert!(result.num_allowed() > 0);
        assert!(result.num_allowed() < result.candidates.len());
        assert!(
            result
                .candidates
                .iter()
                .any(|c| c.formula == "LiCl" && c.smact_allowed)
        );
    }

    #[test]
    fn element_data_file_changes_verdicts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("elements.toml");
        fs::write(&path, "[[element]]\nsymbol = \"Au\"\noxidation-states = [-1]\n").unwrap();

        let base = || {
            GenerationConfigBuilder::new()
                .elements(&["Cs", "Au"])
                .max_stoichiometry(1)
        };
        let plain = run(&base().build().unwrap(), &ProgressReporter::new()).unwrap();
        let with_data = run(
            &base().element_data(Some(path)).build().unwrap(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(!plain.candidates[0].smact_allowed);
        assert!(with_data.candidates[0].smact_allowed);
    }

    #[test]
    fn missing_element_data_file_is_an_error() {
        let config = GenerationConfigBuilder::new()
            .elements(&["Na", "Cl"])
            .element_data(Some("/nonexistent/elements.toml".into()))
            .build()
            .unwrap();
        assert!(matches!(
            run(&config, &ProgressReporter::new()),
            Err(EngineError::ElementData { .. })
        ));
    }

    #[test]
    fn failed_filter_preparation_still_closes_its_phase() {
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            let tag = match event {
                Progress::PhaseStart { name } => format!("start:{}", name),
                Progress::PhaseFinish => "finish".to_string(),
                _ => return,
            };
            events.lock().unwrap().push(tag);
        }));
        let config = GenerationConfigBuilder::new()
            .elements(&["Na", "Cl"])
            .element_data(Some("/nonexistent/elements.toml".into()))
            .build()
            .unwrap();
        assert!(run(&config, &reporter).is_err());
        drop(reporter);

        assert_eq!(
            events.into_inner().unwrap(),
            vec!["start:Preparing Filter".to_string(), "finish".to_string()]
        );
    }
}
