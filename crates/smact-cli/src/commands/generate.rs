use crate::cli::GenerateArgs;
use crate::config::builder::build_generation_config;
use crate::config::file::FileConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use smactpp::core::io::table::write_table;
use smactpp::engine::progress::ProgressReporter;
use smactpp::workflows;
use tracing::info;

pub async fn run(args: GenerateArgs, file_config: &FileConfig, quiet: bool) -> Result<()> {
    let config = build_generation_config(&args, file_config)?;
    info!(
        "Screening {}-element compositions of {:?} (max stoichiometry {}).",
        config.arity, config.elements, config.max_stoichiometry
    );

    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = tokio::task::block_in_place(|| workflows::screen::run(&config, &reporter))?;

    write_table(&args.output, &result.candidates)?;
    println!(
        "✓ {} candidate(s), {} allowed by SMACT, written to: {}",
        result.candidates.len(),
        result.num_allowed(),
        args.output.display()
    );
    Ok(())
}
