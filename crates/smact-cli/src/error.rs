use smactpp::core::io::format::FormatError;
use smactpp::core::io::records::RecordError;
use smactpp::core::io::table::TableError;
use smactpp::core::models::builder::BuildError;
use smactpp::core::symmetry::SymmetryError;
use smactpp::engine::error::EngineError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    SmactCore(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Structure(#[from] FormatError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Symmetry(#[from] SymmetryError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Records(#[from] RecordError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
