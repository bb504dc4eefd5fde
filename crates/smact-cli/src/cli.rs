use crate::utils::parser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use smactpp::core::models::lattice::CellParameters;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "SMACT++ Developers",
    version,
    about = "SMACT++ CLI - Screen candidate compositions with the SMACT filter, label them against the Materials Project, and enumerate symmetry-inequivalent substitutions in seed crystals.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Enumerate candidate compositions and flag each one with the SMACT filter.
    Generate(GenerateArgs),
    /// Download Materials Project records for the formulas in a candidate table.
    Fetch(FetchArgs),
    /// Label candidates as standard, missing, interesting or unlikely.
    Classify(ClassifyArgs),
    /// Build a seed crystal structure from a prototype.
    Build(BuildArgs),
    /// List the symmetry-inequivalent sites of a structure.
    Sites(SitesArgs),
    /// Substitute atoms on every symmetry-inequivalent site, one step at a time.
    Substitute(SubstituteArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Comma-separated element symbols to combine (e.g., 'Li,Na,O,Cl').
    #[arg(short, long, value_delimiter = ',', value_name = "SYMBOLS")]
    pub elements: Vec<String>,

    /// Number of distinct elements per composition (2 to 4).
    #[arg(short, long, value_name = "INT")]
    pub arity: Option<usize>,

    /// Largest count of any single element in a composition.
    #[arg(long = "max-stoich", value_name = "INT")]
    pub max_stoichiometry: Option<u32>,

    /// Path for the output candidate table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Skip the Pauling electronegativity test and check charge neutrality only.
    #[arg(long)]
    pub no_electronegativity: bool,

    /// TOML file overriding oxidation states or electronegativities of selected elements.
    #[arg(long, value_name = "PATH")]
    pub element_data: Option<PathBuf>,
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Candidate table produced by `generate`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory receiving one JSON file per downloaded record.
    /// Defaults to `database.records-dir` or the per-user data directory.
    #[arg(short = 'd', long = "records-dir", value_name = "DIR")]
    pub records_dir: Option<PathBuf>,

    /// Materials Project API key. Falls back to the config file, then to `MP_API_KEY`.
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Only query formulas the SMACT filter allowed.
    #[arg(long)]
    pub allowed_only: bool,
}

/// Arguments for the `classify` subcommand.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Candidate table produced by `generate`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory of downloaded records.
    /// Defaults to `database.records-dir` or the per-user data directory.
    #[arg(short = 'd', long = "records-dir", value_name = "DIR")]
    pub records_dir: Option<PathBuf>,

    /// Path for the labelled output table (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prototype {
    /// ABX3 in Pm-3m (221); species A,B,X.
    Perovskite,
    /// AX in P6_3mc (186); species A,X.
    Wurtzite,
    /// AX in Fm-3m (225); species A,X.
    Rocksalt,
    /// AX in F-43m (216); species A,X.
    Zincblende,
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Structure prototype to build.
    #[arg(value_enum)]
    pub prototype: Prototype,

    /// Comma-separated element symbols in prototype order (e.g., 'Sr,Ti,O').
    #[arg(short, long, required = true, value_delimiter = ',', value_name = "SYMBOLS")]
    pub species: Vec<String>,

    /// Path for the output structure (.cif, .xyz or .extxyz).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Cell parameters 'a,b,c,alpha,beta,gamma'. Rock-salt and zinc-blende use `a` only.
    #[arg(long, value_name = "CELL", value_parser = parser::parse_cell)]
    pub cell: Option<CellParameters>,

    /// Supercell repetitions along a, b and c (e.g., '2x2x2').
    #[arg(short, long, value_name = "NAxNBxNC", value_parser = parser::parse_repeat, default_value = "1x1x1")]
    pub repeat: [usize; 3],
}

/// Arguments for the `sites` subcommand.
#[derive(Args, Debug)]
pub struct SitesArgs {
    /// Input structure (.cif, .xyz or .extxyz).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Only report sites occupied by this element.
    #[arg(short, long, value_name = "SYMBOL")]
    pub element: Option<String>,

    /// Matching tolerance in Angstroms, overriding `symmetry.tolerance`.
    #[arg(short, long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Cif,
    Xyz,
}

/// Arguments for the `substitute` subcommand.
#[derive(Args, Debug)]
pub struct SubstituteArgs {
    /// Input seed structure (.cif, .xyz or .extxyz).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Substitution step 'HOST:DOPANT'. Repeat to substitute again in every result.
    #[arg(short = 'r', long = "replace", required = true, value_name = "HOST:DOPANT", value_parser = parser::parse_replacement)]
    pub replacements: Vec<(String, String)>,

    /// Directory receiving every generated structure.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    /// Format of the written structures.
    #[arg(short, long, value_enum, default_value = "cif")]
    pub format: OutputFormat,

    /// Only write the structures produced by the last step.
    #[arg(long)]
    pub final_only: bool,

    /// Matching tolerance in Angstroms, overriding `symmetry.tolerance`.
    #[arg(short, long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_splits_element_list() {
        let cli = Cli::parse_from([
            "smact", "generate", "-e", "Li,Na,O,Cl", "--arity", "3", "-o", "out.csv", "-j", "4",
        ]);
        assert_eq!(cli.threads, Some(4));
        let Commands::Generate(args) = cli.command else {
            panic!("Expected 'generate' subcommand");
        };
        assert_eq!(args.elements, vec!["Li", "Na", "O", "Cl"]);
        assert_eq!(args.arity, Some(3));
        assert!(!args.no_electronegativity);
    }

    #[test]
    fn build_parses_prototype_cell_and_repeat() {
        let cli = Cli::parse_from([
            "smact",
            "build",
            "perovskite",
            "-s",
            "Sr,Ti,O",
            "-o",
            "seed.cif",
            "--cell",
            "4,4,4,90,90,90",
            "--repeat",
            "2x2x2",
        ]);
        let Commands::Build(args) = cli.command else {
            panic!("Expected 'build' subcommand");
        };
        assert_eq!(args.prototype, Prototype::Perovskite);
        assert_eq!(args.repeat, [2, 2, 2]);
        assert_eq!(args.cell.map(|c| c.a), Some(4.0));
    }

    #[test]
    fn substitute_collects_replacements_in_order() {
        let cli = Cli::parse_from([
            "smact", "substitute", "-i", "seed.cif", "-r", "Ti:Zr", "--replace", "O:F", "-o",
            "out",
        ]);
        let Commands::Substitute(args) = cli.command else {
            panic!("Expected 'substitute' subcommand");
        };
        assert_eq!(
            args.replacements,
            vec![
                ("Ti".to_string(), "Zr".to_string()),
                ("O".to_string(), "F".to_string())
            ]
        );
        assert_eq!(args.format, OutputFormat::Cif);
    }

    #[test]
    fn malformed_repeat_is_rejected_by_clap() {
        let result = Cli::try_parse_from([
            "smact", "build", "wurtzite", "-s", "Zn,O", "-o", "a.cif", "--repeat", "2x2",
        ]);
        assert!(result.is_err());
    }
}
