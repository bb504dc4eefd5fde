use super::config::GenerationConfig;
use super::error::EngineError;
use super::filter::CompositionFilter;
use super::labeling::CandidateRecord;
use super::progress::{Progress, ProgressReporter};
use crate::core::chemistry::composition::Composition;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Enumerates every distinct reduced composition of exactly `config.arity` elements with
/// per-element counts in `1..=config.max_stoichiometry`.
///
/// Output is sorted by formula.
pub fn enumerate_compositions(config: &GenerationConfig) -> Result<Vec<Composition>, EngineError> {
    let mut seen = HashSet::new();
    let mut compositions = Vec::new();

    for combination in config.elements.iter().combinations(config.arity) {
        let counts = (0..config.arity)
            .map(|_| 1..=config.max_stoichiometry)
            .multi_cartesian_product();
        for stoichiometry in counts {
            let pairs = combination
                .iter()
                .map(|e| e.as_str())
                .zip(stoichiometry.iter().copied());
            let reduced = Composition::from_pairs(pairs)?.reduced();
            if seen.insert(reduced.formula()) {
                compositions.push(reduced);
            }
        }
    }
    compositions.sort_by_cached_key(|c| c.formula());
    Ok(compositions)
}

/// Runs `filter` over every enumerated composition.
#[instrument(skip_all, name = "generation_task", fields(arity = config.arity))]
pub fn generate(
    config: &GenerationConfig,
    filter: &dyn CompositionFilter,
    reporter: &ProgressReporter,
) -> Result<Vec<CandidateRecord>, EngineError> {
    let compositions = enumerate_compositions(config)?;
    info!(
        num_elements = config.elements.len(),
        num_compositions = compositions.len(),
        "Enumerated candidate compositions."
    );
    if compositions.is_empty() {
        return Ok(Vec::new());
    }

    reporter.report(Progress::TaskStart {
        total_steps: compositions.len() as u64,
    });
    let evaluate = || evaluate_all(&compositions, filter, reporter);
    let records = match config.num_workers {
        #[cfg(feature = "parallel")]
        Some(workers) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| EngineError::Internal(format!("thread pool: {}", e)))?;
            debug!(workers, "Evaluating filter in a dedicated thread pool.");
            pool.install(evaluate)
        }
        _ => evaluate(),
    };
    reporter.report(Progress::TaskFinish);

    let allowed = records.iter().filter(|r| r.smact_allowed).count();
    info!(allowed, total = records.len(), "Filter evaluation complete.");
    Ok(records)
}

fn evaluate_all(
    compositions: &[Composition],
    filter: &dyn CompositionFilter,
    reporter: &ProgressReporter,
) -> Vec<CandidateRecord> {
    #[cfg(not(feature = "parallel"))]
    let iterator = compositions.iter();

    #[cfg(feature = "parallel")]
    let iterator = compositions.par_iter();

    iterator
        .map(|composition| {
            let record = CandidateRecord {
                formula: composition.formula(),
                smact_allowed: filter.is_allowed(composition),
            };
            reporter.report(Progress::TaskIncrement);
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GenerationConfigBuilder;
    use crate::engine::filter::SmactFilter;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn config(elements: &[&str], arity: usize, max: u32) -> GenerationConfig {
        GenerationConfigBuilder::new()
            .elements(elements)
            .arity(arity)
            .max_stoichiometry(max)
            .build()
            .unwrap()
    }

    #[test]
    fn enumeration_deduplicates_by_reduced_formula() {
        let compositions = enumerate_compositions(&config(&["Na", "Cl"], 2, 2)).unwrap();
        let formulas: Vec<String> = compositions.iter().map(|c| c.formula()).collect();
        // (1,1) and (2,2) both reduce to NaCl.
        assert_eq!(formulas, vec!["Na2Cl", "NaCl", "NaCl2"]);
    }

    #[test]
    fn enumeration_uses_every_element_combination() {
        let compositions = enumerate_compositions(&config(&["Li", "Na", "O"], 2, 1)).unwrap();
        let formulas: HashSet<String> = compositions.iter().map(|c| c.formula()).collect();
        assert_eq!(formulas.len(), 3);
        assert!(formulas.contains("NaLi"));
        assert!(formulas.contains("LiO"));
        assert!(formulas.contains("NaO"));
    }

    #[test]
    fn generate_flags_compositions_with_the_filter() {
        let cfg = config(&["Na", "Cl", "O"], 2, 3);
        let filter = SmactFilter::new(true);
        let records = generate(&cfg, &filter, &ProgressReporter::new()).unwrap();

        let find = |f: &str| records.iter().find(|r| r.formula == f).unwrap();
        assert!(find("NaCl").smact_allowed);
        assert!(!find("NaCl2").smact_allowed);
        assert!(find("Na2O").smact_allowed);

        let mut sorted: Vec<&str> = records.iter().map(|r| r.formula.as_str()).collect();
        sorted.sort();
        let formulas: Vec<&str> = records.iter().map(|r| r.formula.as_str()).collect();
        assert_eq!(formulas, sorted);
    }

    #[test]
    fn generate_reports_one_increment_per_composition() {
        let increments = AtomicU64::new(0);
        let total = AtomicU64::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
            Progress::TaskStart { total_steps } => total.store(total_steps, Ordering::SeqCst),
            Progress::TaskIncrement => {
                increments.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }));
        let cfg = GenerationConfigBuilder::new()
            .elements(&["Fe", "O", "S"])
            .arity(2)
            .max_stoichiometry(4)
            .num_workers(Some(2))
            .build()
            .unwrap();
        let records = generate(&cfg, &SmactFilter::new(true), &reporter).unwrap();
        drop(reporter);

        assert_eq!(total.load(Ordering::SeqCst), records.len() as u64);
        assert_eq!(increments.load(Ordering::SeqCst), records.len() as u64);
    }
}
