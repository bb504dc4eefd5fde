pub mod build;
pub mod classify;
pub mod fetch;
pub mod generate;
pub mod sites;
pub mod substitute;
