//! CLI command implementations
//!
//! Boot sequence for `serve`:
//! 1. Configuration load (file, then CLI overrides)
//! 2. Log level applied
//! 3. Database open (load or initialize the JSON document)
//! 4. Router construction with the store injected as shared state
//! 5. Serve until Ctrl-C

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::json;

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;
use crate::http_server::{HttpServer, TaskState};
use crate::observability::Logger;
use crate::store::Database;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    match cmd {
        Command::Serve { config, port, db } => {
            let config = load_config(config.as_deref(), db, port)?;
            runtime.block_on(serve(config))
        }
        Command::Inspect { config, db } => {
            let config = load_config(config.as_deref(), db, None)?;
            runtime.block_on(inspect(config))
        }
    }
}

/// Resolve the config file and apply command-line overrides
fn load_config(path: Option<&Path>, db: Option<PathBuf>, port: Option<u16>) -> CliResult<Config> {
    let mut config = Config::resolve(path)?;
    if let Some(db) = db {
        config.db_path = db;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    Logger::set_min_severity(config.log_level);
    Ok(config)
}

/// Open the database and serve the task API
pub async fn serve(config: Config) -> CliResult<()> {
    let db = Database::open(&config.db_path, config.on_corrupt).await?;
    let state = Arc::new(TaskState::new(db, config.export_dir()));

    let server = HttpServer::with_config(config.server.clone(), state);
    server
        .start()
        .await
        .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
}

/// Open the database and print per-table record counts
pub async fn inspect(config: Config) -> CliResult<()> {
    let db = Database::open(&config.db_path, config.on_corrupt).await?;
    let tables = db.table_counts().await;

    write_response(json!({
        "db_path": db.path().display().to_string(),
        "tables": tables,
    }))
}
