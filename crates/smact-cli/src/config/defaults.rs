use smactpp::core::symmetry::analysis::DEFAULT_TOLERANCE;
use smactpp::engine::config::{DEFAULT_ARITY, DEFAULT_MAX_STOICHIOMETRY};

pub const API_KEY_ENV: &str = "MP_API_KEY";
pub const MATERIALS_PROJECT_URL: &str = "https://api.materialsproject.org";

pub struct DefaultsConfig {
    pub arity: usize,
    pub max_stoichiometry: u32,
    pub use_electronegativity: bool,
    pub base_url: String,
    pub tolerance: f64,
    pub cubic_lattice_constant: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            arity: DEFAULT_ARITY,
            max_stoichiometry: DEFAULT_MAX_STOICHIOMETRY,
            use_electronegativity: true,
            base_url: MATERIALS_PROJECT_URL.to_string(),
            tolerance: DEFAULT_TOLERANCE,
            cubic_lattice_constant: 6.0,
        }
    }
}
