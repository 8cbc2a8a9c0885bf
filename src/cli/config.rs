//! Configuration file for taskdb
//!
//! A JSON object; every field is optional:
//!
//! ```json
//! {
//!   "db_path": "./db.json",
//!   "export_dir": "/home/me/Downloads",
//!   "on_corrupt": "reset",
//!   "log_level": "info",
//!   "server": { "host": "0.0.0.0", "port": 3333, "cors_origins": [] }
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::http_server::export::default_export_dir;
use crate::http_server::HttpServerConfig;
use crate::observability::Severity;
use crate::store::CorruptPolicy;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_PATH: &str = "./taskdb.json";

/// taskdb configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database document path (default: "./db.json")
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Where `GET /tasks/export` writes `tasks.csv` (default: downloads dir)
    #[serde(default)]
    pub export_dir: Option<PathBuf>,

    /// Behavior when the database document cannot be parsed
    #[serde(default)]
    pub on_corrupt: CorruptPolicy,

    /// Minimum log severity (default: "info")
    #[serde(default = "default_log_level")]
    pub log_level: Severity,

    #[serde(default)]
    pub server: HttpServerConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./db.json")
}

fn default_log_level() -> Severity {
    Severity::Info
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            export_dir: None,
            on_corrupt: CorruptPolicy::default(),
            log_level: default_log_level(),
            server: HttpServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given; otherwise the default file if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match fs::metadata(default_path) {
            Ok(_) => Self::load(default_path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(CliError::config_error(format!(
                "Failed to stat {}: {}",
                DEFAULT_CONFIG_PATH, e
            ))),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(CliError::config_error("db_path must not be empty"));
        }
        if self.server.host.trim().is_empty() {
            return Err(CliError::config_error("server.host must not be empty"));
        }
        Ok(())
    }

    /// Resolved export directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(default_export_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_full_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taskdb.json");
        fs::write(
            &path,
            r#"{
                "db_path": "/var/lib/taskdb/db.json",
                "export_dir": "/tmp/out",
                "on_corrupt": "fail",
                "log_level": "warn",
                "server": {"port": 4000}
            }"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/taskdb/db.json"));
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(config.on_corrupt, CorruptPolicy::Fail);
        assert_eq!(config.log_level, Severity::Warn);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taskdb.json");
        fs::write(&path, "{ nope").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.message().contains("Invalid config JSON"));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"on_corrupt": "ignore"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::resolve(Some(&temp.path().join("absent.json"))).is_err());
    }

    #[test]
    fn test_empty_db_path_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taskdb.json");
        fs::write(&path, r#"{"db_path": ""}"#).unwrap();
        assert!(Config::load(&path).is_err());
    }
}
