//! # SMACT++ Core Library
//!
//! Chemical-composition screening and symmetry-aware atomic substitution for crystalline
//! materials, following the tutorial pipelines of the SMACT toolkit.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same strict three-layer split throughout.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Composition`, `CrystalStructure`),
//!   the element table, space-group generation and symmetry analysis, plus file I/O for
//!   CSV tables, JSON database records, CIF and extended XYZ.
//!
//! - **[`engine`]: The Logic Core.** Configuration builders, the error taxonomy, progress
//!   reporting, the composition filter, parallel candidate generation and the four-way
//!   labelling of candidates against a reference database.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures (`screen`, `classify`,
//!   `substitute`) that tie `engine` and `core` together behind a small surface.

pub mod core;
pub mod engine;
pub mod workflows;
