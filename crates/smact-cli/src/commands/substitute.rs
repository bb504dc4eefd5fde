use crate::cli::{OutputFormat, SubstituteArgs};
use crate::config::builder::resolve_tolerance;
use crate::config::file::FileConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use smactpp::core::io::format::{StructureFormat, read_structure, write_structure};
use smactpp::engine::config::SubstitutionConfigBuilder;
use smactpp::engine::error::EngineError;
use smactpp::engine::progress::ProgressReporter;
use smactpp::workflows::{self, substitute::SubstitutedStructure};
use std::path::{Path, PathBuf};
use tracing::info;

pub async fn run(args: SubstituteArgs, file_config: &FileConfig, quiet: bool) -> Result<()> {
    let tolerance = resolve_tolerance(args.tolerance, file_config)?;
    let config = args
        .replacements
        .iter()
        .fold(SubstitutionConfigBuilder::new(), |builder, (host, dopant)| {
            builder.step(host, dopant)
        })
        .tolerance(tolerance)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    info!("Loading seed structure from {:?}", &args.input);
    let seed = read_structure(&args.input)?;

    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let result =
        tokio::task::block_in_place(|| workflows::substitute::run(&seed, &config, &reporter))?;

    let to_write: Vec<&SubstitutedStructure> = if args.final_only {
        result.final_structures().collect()
    } else {
        result.structures.iter().collect()
    };

    std::fs::create_dir_all(&args.output)?;
    let format = match args.format {
        OutputFormat::Cif => StructureFormat::Cif,
        OutputFormat::Xyz => StructureFormat::ExtendedXyz,
    };
    for (index, substituted) in to_write.iter().enumerate() {
        let path = output_path(&args.output, index + 1, substituted, format)?;
        info!("Writing {} to {:?}", substituted.label(), &path);
        write_structure(&substituted.structure, &path)?;
    }

    println!(
        "✓ {} structure(s) written to: {}",
        to_write.len(),
        args.output.display()
    );
    Ok(())
}

/// `<dir>/<index>_<formula>_<history label>.<ext>`
fn output_path(
    dir: &Path,
    index: usize,
    substituted: &SubstitutedStructure,
    format: StructureFormat,
) -> Result<PathBuf> {
    let formula = substituted
        .structure
        .formula()
        .map_err(EngineError::from)?;
    Ok(dir.join(format!(
        "{:03}_{}_{}.{}",
        index,
        formula,
        substituted.label(),
        format.extension()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smactpp::core::models::builder::cubic_perovskite;
    use smactpp::workflows::substitute::AppliedSubstitution;

    #[test]
    fn output_name_combines_index_formula_and_history() {
        let mut structure = cubic_perovskite(["Sr", "Ti", "O"], None, [1, 1, 1]).unwrap();
        structure.substitute_site(1, "Zr").unwrap();
        let substituted = SubstitutedStructure {
            structure,
            history: vec![AppliedSubstitution {
                host: "Ti".into(),
                dopant: "Zr".into(),
                site_index: 1,
                multiplicity: 1,
            }],
        };
        let path = output_path(Path::new("out"), 7, &substituted, StructureFormat::Cif).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("007_"));
        assert!(name.ends_with("_Ti1-Zr.cif"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn substitution_writes_every_structure() {
        let dir = tempfile::tempdir().unwrap();
        let seed_path = dir.path().join("seed.cif");
        let seed = cubic_perovskite(["Sr", "Ti", "O"], None, [1, 1, 1]).unwrap();
        write_structure(&seed, &seed_path).unwrap();
        let out = dir.path().join("out");

        let args = SubstituteArgs {
            input: seed_path,
            replacements: vec![("Ti".into(), "Zr".into())],
            output: out.clone(),
            format: OutputFormat::Xyz,
            final_only: false,
            tolerance: None,
        };
        run(args, &FileConfig::default(), true).await.unwrap();

        let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(written.len(), 1);
    }
}
