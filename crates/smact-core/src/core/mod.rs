//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! ## Architecture
//!
//! - **Chemistry** ([`chemistry`]) - Element table, charged species and formula parsing
//! - **Crystal Representation** ([`models`]) - Lattices, structures and seed-structure builders
//! - **Symmetry** ([`symmetry`]) - Symmetry operations, space groups and site-orbit analysis
//! - **File I/O** ([`io`]) - CIF, extended XYZ, CSV tables and database record directories
//!
//! Nothing in this module holds global state; every function is a pure transformation of
//! its inputs or a thin wrapper over file access.

pub mod chemistry;
pub mod io;
pub mod models;
pub mod symmetry;
