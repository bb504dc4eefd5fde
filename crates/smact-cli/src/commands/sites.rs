use crate::cli::SitesArgs;
use crate::config::builder::resolve_tolerance;
use crate::config::file::FileConfig;
use crate::error::Result;
use smactpp::core::io::format::read_structure;
use smactpp::core::symmetry::analysis::{SiteGroup, inequivalent_sites};
use tracing::info;

pub fn run(args: SitesArgs, file_config: &FileConfig) -> Result<()> {
    let tolerance = resolve_tolerance(args.tolerance, file_config)?;
    let structure = read_structure(&args.input)?;
    info!(
        "Analysing {} site(s) from {:?} with tolerance {}",
        structure.len(),
        &args.input,
        tolerance
    );

    let groups = inequivalent_sites(&structure, args.element.as_deref(), tolerance)?;
    if groups.is_empty() {
        println!("No matching sites found.");
        return Ok(());
    }
    println!("{}", render_groups(&groups));
    Ok(())
}

fn render_groups(groups: &[SiteGroup]) -> String {
    let mut lines = vec![format!(
        "{:<8} {:>14} {:>12}  members",
        "species", "representative", "multiplicity"
    )];
    lines.extend(groups.iter().map(|g| {
        let members = g
            .members
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{:<8} {:>14} {:>12}  {}",
            g.species,
            g.representative,
            g.multiplicity(),
            members
        )
    }));
    lines.join("\n")
}
