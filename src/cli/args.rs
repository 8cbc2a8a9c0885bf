//! CLI argument definitions using clap
//!
//! Commands:
//! - taskdb serve [--config <path>] [--port <n>] [--db <path>]
//! - taskdb inspect [--config <path>] [--db <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// taskdb - task-management HTTP API backed by a JSON document
#[derive(Parser, Debug)]
#[command(name = "taskdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply if omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on, overriding the config file
        #[arg(long)]
        port: Option<u16>,

        /// Database document path, overriding the config file
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Load the database and print record counts per table
    Inspect {
        /// Path to configuration file (defaults apply if omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Database document path, overriding the config file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
