//! Application configuration.
//!
//! Loaded from environment variables with fallback to defaults; the
//! `--db` flag overrides the database path afterwards.

use std::env;
use std::path::PathBuf;

use arledge_db::{DbConfig, TablePrefix, DEFAULT_TABLE_PREFIX};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "./ledger.db";

/// CLI / MCP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Prefix of every ledger table
    pub table_prefix: String,

    /// Development mode: `database initialize` drops the ledger tables first
    pub development: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            development: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// - `ARLEDGE_DB_PATH` (default `./ledger.db`)
    /// - `ARLEDGE_DB_PREFIX` (default `arledge_`)
    /// - `ARLEDGE_DEVELOPMENT` (`true/false/1/0`, default false)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::load`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let config = AppConfig {
            db_path: lookup("ARLEDGE_DB_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            table_prefix: lookup("ARLEDGE_DB_PREFIX").unwrap_or(defaults.table_prefix),

            development: match lookup("ARLEDGE_DEVELOPMENT") {
                Some(value) => parse_flag("ARLEDGE_DEVELOPMENT", &value)?,
                None => defaults.development,
            },
        };

        // Reject a bad prefix before anything touches the database.
        TablePrefix::new(config.table_prefix.as_str())
            .map_err(|_| ConfigError::InvalidValue("ARLEDGE_DB_PREFIX".to_string()))?;

        Ok(config)
    }

    /// Replaces the database path with the one clap resolved from `--db`
    /// or `ARLEDGE_DB_PATH`.
    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.db_path = path;
        }
        self
    }

    /// Database configuration for this application.
    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        let prefix = TablePrefix::new(self.table_prefix.as_str())
            .map_err(|_| ConfigError::InvalidValue("ARLEDGE_DB_PREFIX".to_string()))?;

        Ok(DbConfig::new(&self.db_path)
            .table_prefix(prefix)
            .development(self.development))
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
