use crate::cli::ClassifyArgs;
use crate::config::builder::resolve_records_dir;
use crate::config::file::FileConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use smactpp::core::io::table::write_table;
use smactpp::engine::labeling::Label;
use smactpp::engine::progress::ProgressReporter;
use smactpp::workflows;
use tracing::info;

pub async fn run(args: ClassifyArgs, file_config: &FileConfig, quiet: bool) -> Result<()> {
    let records_dir = resolve_records_dir(args.records_dir.as_deref(), file_config)?;
    info!("Using records from {:?}", &records_dir);

    let progress_handler = CliProgressHandler::new(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let result = tokio::task::block_in_place(|| {
        workflows::classify::run(&args.input, &records_dir, &reporter)
    })?;

    write_table(&args.output, &result.records)?;
    println!(
        "✓ {} labelled candidate(s) written to: {}",
        result.summary.total(),
        args.output.display()
    );
    for label in Label::ALL {
        println!("  {:<12} {}", label, result.summary.count(label));
    }
    Ok(())
}
