//! campusdb CLI entry point
//!
//! Parses arguments, dispatches to the CLI commands, prints fatal errors to
//! stderr and exits with non-zero on failure. All logic lives in the CLI
//! module.

use campusdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
