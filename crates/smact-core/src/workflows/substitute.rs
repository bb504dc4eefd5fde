use crate::core::models::structure::CrystalStructure;
use crate::core::symmetry::analysis::inequivalent_sites;
use crate::engine::config::{SubstitutionConfig, SubstitutionStep};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// A single applied substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedSubstitution {
    pub host: String,
    pub dopant: String,
    /// Index of the substituted site (the representative of its orbit).
    pub site_index: usize,
    /// Number of sites equivalent to `site_index` before the substitution.
    pub multiplicity: usize,
}

#[derive(Debug, Clone)]
pub struct SubstitutedStructure {
    pub structure: CrystalStructure,
    pub history: Vec<AppliedSubstitution>,
}

impl SubstitutedStructure {
    /// Short identifier built from the history, e.g. `Ti1-Zr_O2-F`.
    pub fn label(&self) -> String {
        self.history
            .iter()
            .map(|s| format!("{}{}-{}", s.host, s.site_index, s.dopant))
            .collect::<Vec<_>>()
            .join("_")
    }
}

#[derive(Debug, Clone)]
pub struct SubstitutionResult {
    /// Every structure generated, in step order; structures from step `k` have `k + 1`
    /// entries in their history.
    pub structures: Vec<SubstitutedStructure>,
}

impl SubstitutionResult {
    pub fn final_structures(&self) -> impl Iterator<Item = &SubstitutedStructure> {
        let depth = self
            .structures
            .iter()
            .map(|s| s.history.len())
            .max()
            .unwrap_or(0);
        self.structures
            .iter()
            .filter(move |s| s.history.len() == depth)
    }
}

/// Applies each substitution step to every symmetry-inequivalent host site.
///
/// Each step takes the structures produced by the previous one, enumerates the orbits of
/// the host element in each, and substitutes the representative site of every orbit.
/// Structures with identical site occupations are produced only once per step.
#[instrument(skip_all, name = "substitution_workflow", fields(num_steps = config.steps.len()))]
pub fn run(
    seed: &CrystalStructure,
    config: &SubstitutionConfig,
    reporter: &ProgressReporter,
) -> Result<SubstitutionResult, EngineError> {
    let mut all = Vec::new();
    let mut current = vec![SubstitutedStructure {
        structure: seed.clone(),
        history: Vec::new(),
    }];

    for step in &config.steps {
        let next = reporter.phase("Substituting", || {
            substitute_step(&current, step, config.tolerance, reporter)
        })?;
        if next.is_empty() {
            warn!(host = %step.host, "No host sites left to substitute.");
            return Err(EngineError::PhaseFailed {
                phase: "Substituting",
                reason: format!("no '{}' sites found in the current structures", step.host),
            });
        }
        info!(
            host = %step.host,
            dopant = %step.dopant,
            num_structures = next.len(),
            "Substitution step complete."
        );
        all.extend(next.iter().cloned());
        current = next;
    }

    Ok(SubstitutionResult { structures: all })
}

/// Substitutes one representative site per host orbit in every parent structure.
fn substitute_step(
    parents: &[SubstitutedStructure],
    step: &SubstitutionStep,
    tolerance: f64,
    reporter: &ProgressReporter,
) -> Result<Vec<SubstitutedStructure>, EngineError> {
    reporter.report(Progress::Message(format!(
        "{} -> {}",
        step.host, step.dopant
    )));
    reporter.report(Progress::TaskStart {
        total_steps: parents.len() as u64,
    });

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut next = Vec::new();
    for parent in parents {
        let groups = inequivalent_sites(&parent.structure, Some(step.host.as_str()), tolerance)?;
        debug!(
            parent = %parent.label(),
            host = %step.host,
            num_orbits = groups.len(),
            "Enumerated host orbits."
        );
        for group in groups {
            let mut structure = parent.structure.clone();
            structure.substitute_site(group.representative, &step.dopant)?;

            let occupation: Vec<String> =
                structure.sites().iter().map(|s| s.species.clone()).collect();
            if !seen.insert(occupation) {
                continue;
            }

            let mut history = parent.history.clone();
            history.push(AppliedSubstitution {
                host: step.host.clone(),
                dopant: step.dopant.clone(),
                site_index: group.representative,
                multiplicity: group.multiplicity(),
            });
            next.push(SubstitutedStructure { structure, history });
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::builder::{cubic_perovskite, wurtzite};
    use crate::core::symmetry::analysis::DEFAULT_TOLERANCE;
    use crate::engine::config::SubstitutionConfigBuilder;
    use std::sync::Mutex;

    #[test]
    fn single_ti_substitution_in_perovskite_supercell_is_unique() {
        let seed = cubic_perovskite(["Sr", "Ti", "O"], None, [2, 2, 2]).unwrap();
        let config = SubstitutionConfigBuilder::new().step("Ti", "Zr").build().unwrap();
        let result = run(&seed, &config, &ProgressReporter::new()).unwrap();

        assert_eq!(result.structures.len(), 1);
        let doped = &result.structures[0];
        assert_eq!(doped.history[0].multiplicity, 8);
        assert_eq!(doped.structure.species_counts().get("Zr"), Some(&1));
        assert_eq!(doped.structure.species_counts().get("Ti"), Some(&7));
    }

    #[test]
    fn second_substitution_splits_the_oxygen_sites() {
        let seed = cubic_perovskite(["Sr", "Ti", "O"], None, [2, 2, 2]).unwrap();
        let config = SubstitutionConfigBuilder::new()
            .step("Ti", "Zr")
            .step("O", "F")
            .build()
            .unwrap();
        let result = run(&seed, &config, &ProgressReporter::new()).unwrap();

        let finals: Vec<_> = result.final_structures().collect();
        assert!(finals.len() > 1);
        assert_eq!(result.structures.len(), 1 + finals.len());
        let total: usize = finals.iter().map(|s| s.history[1].multiplicity).sum();
        assert_eq!(total, 24);
        for s in &finals {
            assert_eq!(s.history.len(), 2);
            assert_eq!(s.structure.species_counts().get("F"), Some(&1));
        }
    }

    #[test]
    fn wurtzite_cation_substitution_gives_one_structure() {
        let seed = wurtzite(["Zn", "O"], None, [1, 1, 1]).unwrap();
        let config = SubstitutionConfigBuilder::new()
            .step("Zn", "Mg")
            .tolerance(DEFAULT_TOLERANCE)
            .build()
            .unwrap();
        let result = run(&seed, &config, &ProgressReporter::new()).unwrap();
        assert_eq!(result.structures.len(), 1);
        assert_eq!(result.structures[0].label(), "Zn0-Mg");
    }

    #[test]
    fn each_step_runs_in_its_own_phase() {
        let phases = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
            Progress::PhaseStart { name } => phases.lock().unwrap().push(name.to_string()),
            Progress::PhaseFinish => phases.lock().unwrap().push("/".to_string()),
            _ => {}
        }));
        let seed = cubic_perovskite(["Sr", "Ti", "O"], None, [1, 1, 1]).unwrap();
        let config = SubstitutionConfigBuilder::new()
            .step("Ti", "Zr")
            .step("Sr", "Ba")
            .build()
            .unwrap();
        run(&seed, &config, &reporter).unwrap();
        drop(reporter);

        assert_eq!(
            phases.into_inner().unwrap(),
            vec!["Substituting", "/", "Substituting", "/"]
        );
    }

    #[test]
    fn absent_host_element_fails_the_phase() {
        let seed = cubic_perovskite(["Sr", "Ti", "O"], None, [1, 1, 1]).unwrap();
        let config = SubstitutionConfigBuilder::new().step("Ba", "Ca").build().unwrap();
        assert!(matches!(
            run(&seed, &config, &ProgressReporter::new()),
            Err(EngineError::PhaseFailed { .. })
        ));
    }
}
