use thiserror::Error;

use super::config::ConfigError;
use crate::core::chemistry::composition::CompositionError;
use crate::core::io::format::FormatError;
use crate::core::io::records::RecordError;
use crate::core::io::table::TableError;
use crate::core::models::builder::BuildError;
use crate::core::models::structure::StructureError;
use crate::core::symmetry::SymmetryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Element data error for '{path}': {message}")]
    ElementData { path: String, message: String },

    #[error("Composition error: {source}")]
    Composition {
        #[from]
        source: CompositionError,
    },

    #[error("Table error: {source}")]
    Table {
        #[from]
        source: TableError,
    },

    #[error("Database record error: {source}")]
    Records {
        #[from]
        source: RecordError,
    },

    #[error("Structure file error: {source}")]
    Format {
        #[from]
        source: FormatError,
    },

    #[error("Structure error: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Seed structure could not be built: {source}")]
    Build {
        #[from]
        source: BuildError,
    },

    #[error("Symmetry analysis failed: {source}")]
    Symmetry {
        #[from]
        source: SymmetryError,
    },

    #[error("Phase '{phase}' failed: {reason}")]
    PhaseFailed { phase: &'static str, reason: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
