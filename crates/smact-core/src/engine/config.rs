use crate::core::chemistry::elements;
use crate::core::symmetry::analysis::DEFAULT_TOLERANCE;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
    #[error("Unknown element symbol '{0}'")]
    UnknownElement(String),
}

pub const MIN_ARITY: usize = 2;
pub const MAX_ARITY: usize = 4;
pub const DEFAULT_ARITY: usize = 2;
pub const DEFAULT_MAX_STOICHIOMETRY: u32 = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub elements: Vec<String>,
    pub arity: usize,
    pub max_stoichiometry: u32,
    pub num_workers: Option<usize>,
    pub use_electronegativity: bool,
    /// Optional TOML file overriding the built-in oxidation states and electronegativities.
    pub element_data: Option<PathBuf>,
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    elements: Option<Vec<String>>,
    arity: Option<usize>,
    max_stoichiometry: Option<u32>,
    num_workers: Option<usize>,
    use_electronegativity: Option<bool>,
    element_data: Option<PathBuf>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements<S: AsRef<str>>(mut self, elements: &[S]) -> Self {
        self.elements = Some(elements.iter().map(|e| e.as_ref().to_string()).collect());
        self
    }
    pub fn arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }
    pub fn max_stoichiometry(mut self, max: u32) -> Self {
        self.max_stoichiometry = Some(max);
        self
    }
    pub fn num_workers(mut self, workers: Option<usize>) -> Self {
        self.num_workers = workers;
        self
    }
    pub fn use_electronegativity(mut self, enabled: bool) -> Self {
        self.use_electronegativity = Some(enabled);
        self
    }
    pub fn element_data(mut self, path: Option<PathBuf>) -> Self {
        self.element_data = path;
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let mut symbols = self
            .elements
            .ok_or(ConfigError::MissingParameter("elements"))?;
        if let Some(unknown) = symbols.iter().find(|e| !elements::is_element(e)) {
            return Err(ConfigError::UnknownElement(unknown.clone()));
        }
        symbols.sort();
        symbols.dedup();

        let arity = self.arity.unwrap_or(DEFAULT_ARITY);
        if !(MIN_ARITY..=MAX_ARITY).contains(&arity) {
            return Err(ConfigError::InvalidParameter {
                parameter: "arity",
                reason: format!("must be between {} and {}", MIN_ARITY, MAX_ARITY),
            });
        }
        if symbols.len() < arity {
            return Err(ConfigError::InvalidParameter {
                parameter: "elements",
                reason: format!(
                    "{} distinct elements cannot form {}-element compositions",
                    symbols.len(),
                    arity
                ),
            });
        }

        let max_stoichiometry = self.max_stoichiometry.unwrap_or(DEFAULT_MAX_STOICHIOMETRY);
        if max_stoichiometry == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "max_stoichiometry",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.num_workers == Some(0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "num_workers",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(GenerationConfig {
            elements: symbols,
            arity,
            max_stoichiometry,
            num_workers: self.num_workers,
            use_electronegativity: self.use_electronegativity.unwrap_or(true),
            element_data: self.element_data,
        })
    }
}

/// One substitution step: every inequivalent `host` site is replaced by `dopant` in turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionStep {
    pub host: String,
    pub dopant: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionConfig {
    pub steps: Vec<SubstitutionStep>,
    pub tolerance: f64,
}

#[derive(Default)]
pub struct SubstitutionConfigBuilder {
    steps: Vec<SubstitutionStep>,
    tolerance: Option<f64>,
}

impl SubstitutionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, host: &str, dopant: &str) -> Self {
        self.steps.push(SubstitutionStep {
            host: host.to_string(),
            dopant: dopant.to_string(),
        });
        self
    }
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<SubstitutionConfig, ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::MissingParameter("steps"));
        }
        for step in &self.steps {
            for symbol in [&step.host, &step.dopant] {
                if !elements::is_element(symbol) {
                    return Err(ConfigError::UnknownElement(symbol.clone()));
                }
            }
        }
        let tolerance = self.tolerance.unwrap_or(DEFAULT_TOLERANCE);
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(ConfigError::InvalidParameter {
                parameter: "tolerance",
                reason: format!("must be a positive number (got {})", tolerance),
            });
        }
        Ok(SubstitutionConfig {
            steps: self.steps,
            tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_builder_applies_defaults_and_deduplicates() {
        let config = GenerationConfigBuilder::new()
            .elements(&["O", "Na", "Cl", "Na"])
            .build()
            .unwrap();
        assert_eq!(config.elements, vec!["Cl", "Na", "O"]);
        assert_eq!(config.arity, DEFAULT_ARITY);
        assert_eq!(config.max_stoichiometry, DEFAULT_MAX_STOICHIOMETRY);
        assert!(config.use_electronegativity);
        assert_eq!(config.num_workers, None);
    }

    #[test]
    fn generation_builder_requires_elements() {
        assert_eq!(
            GenerationConfigBuilder::new().arity(2).build(),
            Err(ConfigError::MissingParameter("elements"))
        );
    }

    #[test]
    fn generation_builder_rejects_unknown_elements() {
        assert_eq!(
            GenerationConfigBuilder::new().elements(&["Na", "Xx"]).build(),
            Err(ConfigError::UnknownElement("Xx".to_string()))
        );
    }

    #[test]
    fn generation_builder_rejects_out_of_range_values() {
        let base = || GenerationConfigBuilder::new().elements(&["Li", "Na", "K", "O", "F"]);
        assert!(matches!(
            base().arity(5).build(),
            Err(ConfigError::InvalidParameter { parameter: "arity", .. })
        ));
        assert!(matches!(
            base().arity(1).build(),
            Err(ConfigError::InvalidParameter { parameter: "arity", .. })
        ));
        assert!(matches!(
            base().max_stoichiometry(0).build(),
            Err(ConfigError::InvalidParameter { parameter: "max_stoichiometry", .. })
        ));
        assert!(matches!(
            base().num_workers(Some(0)).build(),
            Err(ConfigError::InvalidParameter { parameter: "num_workers", .. })
        ));
        assert!(matches!(
            GenerationConfigBuilder::new().elements(&["Na", "Cl"]).arity(3).build(),
            Err(ConfigError::InvalidParameter { parameter: "elements", .. })
        ));
    }

    #[test]
    fn substitution_builder_collects_steps_in_order() {
        let config = SubstitutionConfigBuilder::new()
            .step("Ti", "Zr")
            .step("O", "F")
            .build()
            .unwrap();
        assert_eq!(config.steps.len(), 2);
        assert_eq!(config.steps[1].host, "O");
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn substitution_builder_validates_input() {
        assert_eq!(
            SubstitutionConfigBuilder::new().build(),
            Err(ConfigError::MissingParameter("steps"))
        );
        assert_eq!(
            SubstitutionConfigBuilder::new().step("Ti", "Qq").build(),
            Err(ConfigError::UnknownElement("Qq".to_string()))
        );
        assert!(matches!(
            SubstitutionConfigBuilder::new()
                .step("Ti", "Zr")
                .tolerance(-1.0)
                .build(),
            Err(ConfigError::InvalidParameter { parameter: "tolerance", .. })
        ));
    }
}
