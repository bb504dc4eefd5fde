//! # Symmetry Module
//!
//! Crystallographic symmetry used to build seed structures and to decide which substitution
//! sites are genuinely different.
//!
//! - [`ops`] - Space-group operations `(W, t)` in fractional coordinates, parsed from and
//!   rendered to coordinate triplets such as `-y,x-y,z+1/2`
//! - [`spacegroup`] - A small table of space groups expanded from their generators
//! - [`analysis`] - Symmetry search on a concrete structure and grouping of equivalent sites

pub mod analysis;
pub mod ops;
pub mod spacegroup;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum SymmetryError {
    #[error("Space group {0} is not supported")]
    UnsupportedSpaceGroup(u16),

    #[error("Symmetry tolerance must be a positive number (got {0})")]
    InvalidTolerance(f64),

    #[error("Internal symmetry error: {0}")]
    Internal(String),
}
