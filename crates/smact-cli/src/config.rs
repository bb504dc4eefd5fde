//! Configuration layering for the CLI: command-line flags override the TOML file, which
//! overrides the built-in defaults.

pub mod builder;
pub mod defaults;
pub mod file;
