//! # Core Models Module
//!
//! Data structures describing periodic crystals.
//!
//! - [`lattice`] - Lattice vectors, cell parameters and coordinate conversions
//! - [`structure`] - `CrystalStructure`, its sites, substitution and supercell expansion
//! - [`builder`] - Seed structures expanded from a space group (perovskite, wurtzite, ...)
//!
//! ## Usage
//!
//! ```ignore
//! use smactpp::core::models::builder::cubic_perovskite;
//!
//! let mut seed = cubic_perovskite(["Sr", "Ti", "O"], None, [2, 2, 2])?;
//! seed.substitute_site(1, "Zr")?;
//! ```

pub mod builder;
pub mod lattice;
pub mod structure;
