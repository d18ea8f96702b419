//! Argument parsing and startup wiring for the `owrap` binary.

mod cli;

pub use cli::Cli;
