
// Utilities: CLI flags, TOML job file, error types.

pub mod cli;
pub mod config;
pub mod error;
