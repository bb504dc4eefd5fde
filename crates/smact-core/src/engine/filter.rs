use super::error::EngineError;
use crate::core::chemistry::composition::Composition;
use crate::core::chemistry::elements;
use crate::core::chemistry::species::SpeciesSet;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A chemical-validity rule applied to candidate compositions.
pub trait CompositionFilter: Sync {
    fn is_allowed(&self, composition: &Composition) -> bool;
}

impl<F> CompositionFilter for F
where
    F: Fn(&Composition) -> bool + Sync,
{
    fn is_allowed(&self, composition: &Composition) -> bool {
        self(composition)
    }
}

/// Replacement reference data for one element, as read from an element-data TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ElementOverride {
    pub symbol: String,
    #[serde(alias = "oxidation_states")]
    pub oxidation_states: Option<Vec<i8>>,
    pub electronegativity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElementOverrides {
    #[serde(default)]
    pub element: Vec<ElementOverride>,
}

impl ElementOverrides {
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let data_error = |message: String| EngineError::ElementData {
            path: path.to_string_lossy().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| data_error(e.to_string()))?;
        let overrides: Self = toml::from_str(&content).map_err(|e| data_error(e.to_string()))?;
        if let Some(unknown) = overrides
            .element
            .iter()
            .find(|o| !elements::is_element(&o.symbol))
        {
            return Err(data_error(format!(
                "unknown element symbol '{}'",
                unknown.symbol
            )));
        }
        Ok(overrides)
    }
}

/// The SMACT screening rule.
///
/// A composition passes when some assignment of one oxidation state per element balances
/// the charge for the given stoichiometry and, when enabled, every cation in that
/// assignment is less electronegative than every anion. Compositions of a single element
/// always pass; any element without known oxidation states fails the whole composition.
#[derive(Debug, Clone)]
pub struct SmactFilter {
    use_electronegativity: bool,
    overrides: HashMap<String, ElementOverride>,
}

impl SmactFilter {
    pub fn new(use_electronegativity: bool) -> Self {
        Self {
            use_electronegativity,
            overrides: HashMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: ElementOverrides) -> Self {
        for entry in overrides.element {
            self.overrides.insert(entry.symbol.clone(), entry);
        }
        self
    }

    pub fn oxidation_states(&self, symbol: &str) -> &[i8] {
        if let Some(states) = self
            .overrides
            .get(symbol)
            .and_then(|o| o.oxidation_states.as_deref())
        {
            return states;
        }
        elements::lookup(symbol)
            .map(|e| e.oxidation_states)
            .unwrap_or(&[])
    }

    pub fn electronegativity(&self, symbol: &str) -> Option<f64> {
        self.overrides
            .get(symbol)
            .and_then(|o| o.electronegativity)
            .or_else(|| elements::electronegativity(symbol))
    }

    fn passes_pauling_test(&self, assignment: &[(&str, i8)]) -> bool {
        let mut max_cation = f64::NEG_INFINITY;
        let mut min_anion = f64::INFINITY;
        for &(symbol, charge) in assignment {
            if charge == 0 {
                continue;
            }
            let Some(en) = self.electronegativity(symbol) else {
                return false;
            };
            if charge > 0 {
                max_cation = max_cation.max(en);
            } else {
                min_anion = min_anion.min(en);
            }
        }
        max_cation < min_anion
    }
}

impl CompositionFilter for SmactFilter {
    fn is_allowed(&self, composition: &Composition) -> bool {
        self.charge_balanced_species(composition).is_some()
    }
}

impl SmactFilter {
    /// The first oxidation-state assignment that passes the rule, as a species set.
    ///
    /// A single element is returned in its neutral state.
    pub fn charge_balanced_species(&self, composition: &Composition) -> Option<SpeciesSet> {
        if composition.num_elements() == 1 {
            let triples: Vec<(&str, i8, u32)> =
                composition.iter().map(|(symbol, amount)| (symbol, 0, amount)).collect();
            return SpeciesSet::from_triples(&triples).ok();
        }
        let entries: Vec<(&str, u32, &[i8])> = composition
            .iter()
            .map(|(symbol, amount)| (symbol, amount, self.oxidation_states(symbol)))
            .collect();
        if entries.iter().any(|(_, _, states)| states.is_empty()) {
            debug!(formula = %composition, "Element without oxidation states; rejected.");
            return None;
        }

        let mut assignment: Vec<(&str, i8)> = Vec::with_capacity(entries.len());
        if !self.search(&entries, &mut assignment, 0) {
            return None;
        }
        let triples: Vec<(&str, i8, u32)> = assignment
            .iter()
            .zip(&entries)
            .map(|(&(symbol, charge), &(_, amount, _))| (symbol, charge, amount))
            .collect();
        SpeciesSet::from_triples(&triples).ok()
    }

    /// Depth-first over oxidation-state assignments, stopping at the first valid one.
    ///
    /// On success `assignment` holds the accepted states.
    fn search<'a>(
        &self,
        entries: &[(&'a str, u32, &[i8])],
        assignment: &mut Vec<(&'a str, i8)>,
        charge: i64,
    ) -> bool {
        let depth = assignment.len();
        if depth == entries.len() {
            return charge == 0
                && (!self.use_electronegativity || self.passes_pauling_test(assignment));
        }
        let (symbol, amount, states) = entries[depth];
        for &state in states {
            assignment.push((symbol, state));
            let next = charge + i64::from(state) * i64::from(amount);
            if self.search(entries, assignment, next) {
                return true;
            }
            assignment.pop();
        }
        false
    }
}
