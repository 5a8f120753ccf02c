//! CLI argument definitions using clap
//!
//! Commands:
//! - campusdb query --config <path>
//! - campusdb start --config <path>
//! - campusdb datasets --config <path>
//! - campusdb add --config <path> --id <id> --kind <courses|rooms> --file <path>
//! - campusdb remove --config <path> --id <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::dataset::DatasetKind;

/// campusdb - A strict, deterministic query engine for course and room datasets
#[derive(Parser, Debug)]
#[command(name = "campusdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single query read from stdin and exit
    Query {
        /// Path to configuration file
        #[arg(long, default_value = "./campusdb.json")]
        config: PathBuf,
    },

    /// Answer one query per stdin line until end of input
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./campusdb.json")]
        config: PathBuf,
    },

    /// List registered datasets
    Datasets {
        /// Path to configuration file
        #[arg(long, default_value = "./campusdb.json")]
        config: PathBuf,
    },

    /// Register a dataset from a JSON array of extracted records
    Add {
        /// Path to configuration file
        #[arg(long, default_value = "./campusdb.json")]
        config: PathBuf,

        /// Dataset id (non-empty, no underscores)
        #[arg(long)]
        id: String,

        /// Dataset kind
        #[arg(long)]
        kind: DatasetKind,

        /// JSON file holding the records
        #[arg(long)]
        file: PathBuf,
    },

    /// Remove a dataset and its files
    Remove {
        /// Path to configuration file
        #[arg(long, default_value = "./campusdb.json")]
        config: PathBuf,

        /// Dataset id
        #[arg(long)]
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
