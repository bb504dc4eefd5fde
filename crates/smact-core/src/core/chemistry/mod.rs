//! Chemical primitives: the element table, oxidation-state species and integer compositions.
//!
//! - [`elements`] - Static element data (atomic number, Pauling electronegativity, oxidation states)
//! - [`species`] - Parsing and rendering of species strings such as `Fe2+` and `O2-`
//! - [`composition`] - Formula parsing, reduction and the canonical reduced formula

pub mod composition;
pub mod elements;
pub mod species;
