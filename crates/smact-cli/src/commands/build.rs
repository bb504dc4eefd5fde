use crate::cli::{BuildArgs, Prototype};
use crate::config::defaults::DefaultsConfig;
use crate::error::{CliError, Result};
use smactpp::core::io::format::write_structure;
use smactpp::core::models::builder::{cubic_perovskite, rocksalt, wurtzite, zincblende};
use smactpp::core::models::structure::CrystalStructure;
use smactpp::engine::error::EngineError;
use tracing::info;

pub fn run(args: BuildArgs) -> Result<()> {
    let structure = build_prototype(&args)?;
    info!(
        "Built {:?} with {} site(s); writing to {:?}",
        args.prototype,
        structure.len(),
        &args.output
    );
    write_structure(&structure, &args.output)?;
    println!(
        "✓ {} ({} sites) written to: {}",
        structure.formula().map_err(EngineError::from)?,
        structure.len(),
        args.output.display()
    );
    Ok(())
}

fn build_prototype(args: &BuildArgs) -> Result<CrystalStructure> {
    let species: Vec<&str> = args.species.iter().map(String::as_str).collect();
    let cubic_a = args
        .cell
        .map(|c| c.a)
        .unwrap_or(DefaultsConfig::default().cubic_lattice_constant);

    let structure = match args.prototype {
        Prototype::Perovskite => cubic_perovskite(species_array(&species)?, args.cell, args.repeat)?,
        Prototype::Wurtzite => wurtzite(species_array(&species)?, args.cell, args.repeat)?,
        Prototype::Rocksalt => rocksalt(species_array(&species)?, cubic_a, args.repeat)?,
        Prototype::Zincblende => zincblende(species_array(&species)?, cubic_a, args.repeat)?,
    };
    Ok(structure)
}

fn species_array<'a, const N: usize>(species: &[&'a str]) -> Result<[&'a str; N]> {
    species.try_into().map_err(|_| {
        CliError::Argument(format!(
            "This prototype takes {} species, got {} ({})",
            N,
            species.len(),
            species.join(",")
        ))
    })
}
