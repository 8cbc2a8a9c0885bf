//! CLI module for taskdb
//!
//! Provides command-line interface for:
//! - serve: Open the database and run the HTTP API
//! - inspect: Open the database and print table counts

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{inspect, run, run_command, serve};
pub use config::{Config, DEFAULT_CONFIG_PATH};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
