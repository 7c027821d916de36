//! # fellow CLI
//!
//! Command-line interface for the Fellow knowledge-store synchronization
//! engine.
//!
//! This binary provides human-friendly access to `fellow-core`
//! functionality. Run `fellow --help` for usage information.

mod cli;
pub mod ui;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
