use crate::cli::FetchArgs;
use crate::config::builder::{
    api_key_from_env, resolve_api_key, resolve_base_url, resolve_records_dir,
};
use crate::config::file::FileConfig;
use crate::database::MaterialsProjectClient;
use crate::error::{CliError, Result};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use smactpp::core::chemistry::composition::Composition;
use smactpp::core::io::records::write_record;
use smactpp::core::io::table::read_table;
use smactpp::engine::labeling::CandidateRecord;
use std::collections::BTreeSet;
use tracing::{info, warn};

pub async fn run(args: FetchArgs, file_config: &FileConfig, quiet: bool) -> Result<()> {
    let api_key = resolve_api_key(args.api_key.as_deref(), file_config, api_key_from_env())?;
    let base_url = resolve_base_url(file_config);
    let records_dir = resolve_records_dir(args.records_dir.as_deref(), file_config)?;
    std::fs::create_dir_all(&records_dir)?;

    let candidates: Vec<CandidateRecord> = read_table(&args.input)?;
    let formulas = query_formulas(&candidates, args.allowed_only)?;
    info!(
        "Fetching {} formula(s) from {} into {:?}",
        formulas.len(),
        base_url,
        &records_dir
    );

    let client = MaterialsProjectClient::new(&base_url, api_key);
    let pb = ProgressBar::new(formulas.len() as u64);
    if quiet {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut written = 0usize;
    let mut skipped = 0usize;
    for formula in &formulas {
        pb.set_message(formula.clone());
        match client.fetch_formula(formula).await {
            Ok(records) => {
                for record in &records {
                    write_record(&records_dir, record)?;
                }
                written += records.len();
            }
            Err(CliError::Database(reason)) => {
                warn!("Skipping '{}': {}", formula, reason);
                skipped += 1;
            }
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("✓ Done");

    println!(
        "✓ {} record(s) for {} formula(s) written to: {}",
        written,
        formulas.len() - skipped,
        records_dir.display()
    );
    if skipped > 0 {
        println!("  {} formula(s) skipped, see the log for details.", skipped);
    }
    Ok(())
}

/// Distinct reduced formulas to query, in sorted order.
fn query_formulas(candidates: &[CandidateRecord], allowed_only: bool) -> Result<BTreeSet<String>> {
    candidates
        .iter()
        .filter(|c| !allowed_only || c.smact_allowed)
        .map(|c| {
            c.formula
                .parse::<Composition>()
                .map(|comp| comp.reduced_formula())
                .map_err(|e| CliError::Argument(format!("candidate '{}': {}", c.formula, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(formula: &str, allowed: bool) -> CandidateRecord {
        CandidateRecord {
            formula: formula.to_string(),
            smact_allowed: allowed,
        }
    }

    #[test]
    fn formulas_are_reduced_and_deduplicated() {
        let candidates = vec![
            candidate("Cs1Pb1I3", true),
            candidate("CsPbI3", true),
            candidate("NaCl2", false),
        ];
        let all = query_formulas(&candidates, false).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.contains("CsPbI3"));

        let allowed = query_formulas(&candidates, true).unwrap();
        assert_eq!(allowed.into_iter().collect::<Vec<_>>(), vec!["CsPbI3"]);
    }

    #[test]
    fn unparsable_candidate_is_an_argument_error() {
        let result = query_formulas(&[candidate("Qq2", true)], false);
        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}
