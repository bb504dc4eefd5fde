//! # Workflows Module
//!
//! Top-level entry points. Each workflow loads its inputs, drives the engine, reports
//! progress and returns a plain result struct; writing results out is left to the caller.
//!
//! - **Screening** ([`screen`]) - Enumerate compositions and apply the SMACT filter
//! - **Classification** ([`classify`]) - Join a candidate table with downloaded database
//!   records and assign the four-way label
//! - **Substitution** ([`substitute`]) - Repeated substitution on symmetry-inequivalent sites

pub mod classify;
pub mod screen;
pub mod substitute;
