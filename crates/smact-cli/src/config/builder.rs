use super::defaults::{API_KEY_ENV, DefaultsConfig};
use super::file::FileConfig;
use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use directories::ProjectDirs;
use smactpp::engine::config::{GenerationConfig, GenerationConfigBuilder};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Merges `generate` flags over the `[generation]` table over the defaults.
pub fn build_generation_config(
    args: &GenerateArgs,
    file: &FileConfig,
) -> Result<GenerationConfig> {
    let defaults = DefaultsConfig::default();
    let file_gen = &file.generation;

    let elements: Vec<String> = if !args.elements.is_empty() {
        args.elements.clone()
    } else {
        file_gen.elements.clone().unwrap_or_default()
    };
    if elements.is_empty() {
        return Err(CliError::Config(
            "No elements given. Pass '--elements' or set 'generation.elements'.".to_string(),
        ));
    }

    let arity = args.arity.or(file_gen.arity).unwrap_or(defaults.arity);
    let max_stoichiometry = args
        .max_stoichiometry
        .or(file_gen.max_stoichiometry)
        .unwrap_or(defaults.max_stoichiometry);
    let use_electronegativity = if args.no_electronegativity {
        false
    } else {
        file_gen
            .use_electronegativity
            .unwrap_or(defaults.use_electronegativity)
    };
    let element_data = args
        .element_data
        .clone()
        .or_else(|| file_gen.element_data.clone());

    debug!(
        ?elements,
        arity, max_stoichiometry, use_electronegativity, "Resolved generation settings."
    );

    GenerationConfigBuilder::new()
        .elements(&elements)
        .arity(arity)
        .max_stoichiometry(max_stoichiometry)
        .use_electronegativity(use_electronegativity)
        .element_data(element_data)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))
}

/// Picks the API key from the flag, then the config file, then the environment value.
///
/// `env` is the value of `MP_API_KEY`, passed in by the caller.
pub fn resolve_api_key(
    cli: Option<&str>,
    file: &FileConfig,
    env: Option<String>,
) -> Result<String> {
    cli.map(str::to_string)
        .or_else(|| file.database.api_key.clone())
        .or(env)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            CliError::Config(format!(
                "No Materials Project API key found. Pass '--api-key', set 'database.api-key', or export {}.",
                API_KEY_ENV
            ))
        })
}

pub fn api_key_from_env() -> Option<String> {
    std::env::var(API_KEY_ENV).ok()
}

pub fn resolve_base_url(file: &FileConfig) -> String {
    file.database
        .base_url
        .clone()
        .unwrap_or_else(|| DefaultsConfig::default().base_url)
}

pub fn resolve_records_dir(cli: Option<&Path>, file: &FileConfig) -> Result<PathBuf> {
    if let Some(dir) = cli.map(Path::to_path_buf).or_else(|| file.database.records_dir.clone()) {
        return Ok(dir);
    }
    default_records_dir()
}

/// `<data dir>/records` under the per-user project directory.
pub fn default_records_dir() -> Result<PathBuf> {
    ProjectDirs::from("org", "smact", "smactpp")
        .map(|dirs| dirs.data_dir().join("records"))
        .ok_or_else(|| {
            CliError::Config(
                "Could not determine a home directory for the default records location."
                    .to_string(),
            )
        })
}

pub fn resolve_tolerance(cli: Option<f64>, file: &FileConfig) -> Result<f64> {
    let tolerance = cli
        .or(file.symmetry.tolerance)
        .unwrap_or(DefaultsConfig::default().tolerance);
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(CliError::Argument(format!(
            "Tolerance must be a positive number, got {}",
            tolerance
        )));
    }
    Ok(tolerance)
}
