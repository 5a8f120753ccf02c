//! CLI module for campusdb
//!
//! Provides command-line interface for:
//! - query: One-shot query execution
//! - start: Line-delimited query loop over stdin
//! - datasets: List registered datasets
//! - add / remove: Manage datasets

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{add, datasets, query, remove, run, run_command, serve, start};
pub use config::Config;
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_requests, write_response};
