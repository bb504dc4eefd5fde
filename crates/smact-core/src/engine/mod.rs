//! # Engine Module
//!
//! The screening engine: it turns a list of elements into labelled candidate compositions.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Validated builders for generation and substitution runs
//! - **Filtering** ([`filter`]) - The `CompositionFilter` seam and the SMACT charge-neutrality
//!   and electronegativity rule
//! - **Generation** ([`generation`]) - Combinatorial enumeration of compositions, evaluated
//!   in parallel when the `parallel` feature is enabled
//! - **Labelling** ([`labeling`]) - The four-way label and the join against database formulas
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - `EngineError`, wrapping every core error type

pub mod config;
pub mod error;
pub mod filter;
pub mod generation;
pub mod labeling;
pub mod progress;
