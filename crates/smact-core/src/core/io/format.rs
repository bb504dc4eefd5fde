use super::cif::{CifError, CifFile};
use super::traits::StructureFile;
use super::xyz::{XyzError, XyzFile};
use crate::core::models::structure::CrystalStructure;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Cannot infer structure format from '{0}' (expected .cif, .xyz or .extxyz)")]
    UnknownExtension(String),
    #[error(transparent)]
    Cif(#[from] CifError),
    #[error(transparent)]
    Xyz(#[from] XyzError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Cif,
    ExtendedXyz,
}

impl StructureFormat {
    pub fn from_path(path: &Path) -> Result<Self, FormatError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("cif") => Ok(Self::Cif),
            Some("xyz") | Some("extxyz") => Ok(Self::ExtendedXyz),
            _ => Err(FormatError::UnknownExtension(
                path.to_string_lossy().to_string(),
            )),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Cif => "cif",
            Self::ExtendedXyz => "xyz",
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cif => write!(f, "CIF"),
            Self::ExtendedXyz => write!(f, "extended XYZ"),
        }
    }
}

/// Reads a structure, choosing the parser from the file extension.
pub fn read_structure(path: &Path) -> Result<CrystalStructure, FormatError> {
    match StructureFormat::from_path(path)? {
        StructureFormat::Cif => Ok(CifFile::read_from_path(path)?),
        StructureFormat::ExtendedXyz => Ok(XyzFile::read_from_path(path)?),
    }
}

/// Writes a structure, choosing the writer from the file extension.
pub fn write_structure(structure: &CrystalStructure, path: &Path) -> Result<(), FormatError> {
    match StructureFormat::from_path(path)? {
        StructureFormat::Cif => CifFile::write_to_path(structure, path)?,
        StructureFormat::ExtendedXyz => XyzFile::write_to_path(structure, path)?,
    }
    Ok(())
}
