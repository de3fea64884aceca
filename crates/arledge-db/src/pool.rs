//! # Database Pool Management
//!
//! Connection pool creation and configuration for SQLite.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  CLI / MCP startup                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path)                                                   │
//! │     .table_prefix(TablePrefix::new("arledge_")?)                       │
//! │     .development(false)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await ← Create pool + create tables             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐                │  (max_connections)        │
//! │  │  │Conn1│ │Conn2│ │Conn3│ ...            │                           │
//! │  │  └─────┘ └─────┘ └─────┘                │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.customers() / db.creditors() / db.invoices() ...                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Explicit Configuration
//! The table prefix and the development flag are part of [`DbConfig`] and
//! travel with the [`Database`] handle. Nothing is read from globals.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations::{self, SchemaStatus, Tables};
use crate::repository::creditor::CreditorRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::payment_account::PaymentAccountRepository;

/// Prefix used when none is configured.
pub const DEFAULT_TABLE_PREFIX: &str = "arledge_";

// =============================================================================
// Table Prefix
// =============================================================================

/// A validated table-name prefix.
///
/// Only ASCII letters, digits and `_` are allowed, so the prefix can be
/// spliced into SQL identifiers. The empty prefix is valid.
///
/// ## Example
/// ```rust
/// use arledge_db::TablePrefix;
///
/// assert_eq!(TablePrefix::new("acme_").unwrap().table("invoice"), "acme_invoice");
/// assert!(TablePrefix::new("bad-prefix!").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePrefix(String);

impl TablePrefix {
    pub fn new(prefix: impl Into<String>) -> DbResult<Self> {
        let prefix = prefix.into();
        if let Some(bad) = prefix
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(DbError::InvalidConfig(format!(
                "table prefix '{prefix}' contains '{bad}'; only letters, digits and '_' are allowed"
            )));
        }
        Ok(TablePrefix(prefix))
    }

    /// Full table name for a base name.
    pub fn table(&self, base: &str) -> String {
        format!("{}{}", self.0, base)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TablePrefix {
    fn default() -> Self {
        TablePrefix(DEFAULT_TABLE_PREFIX.to_string())
    }
}

impl fmt::Display for TablePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./ledger.db")
///     .table_prefix(TablePrefix::new("acme_")?)
///     .max_connections(5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file. Ignored when `in_memory` is set.
    pub database_path: PathBuf,

    /// Private in-memory database (tests).
    pub in_memory: bool,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to create missing tables and columns on connect.
    /// Never destructive, even in development mode.
    /// Default: true
    pub ensure_schema: bool,

    /// Prefix of every ledger table.
    pub table_prefix: TablePrefix,

    /// Development mode: [`Database::initialize`] drops the ledger tables first.
    pub development: bool,
}

impl DbConfig {
    /// Creates a new database configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Will be created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            in_memory: false,
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            ensure_schema: true,
            table_prefix: TablePrefix::default(),
            development: false,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to create missing tables on connect.
    pub fn ensure_schema(mut self, run: bool) -> Self {
        self.ensure_schema = run;
        self
    }

    /// Sets the table prefix.
    pub fn table_prefix(mut self, prefix: TablePrefix) -> Self {
        self.table_prefix = prefix;
        self
    }

    /// Enables development mode (destructive re-initialization).
    pub fn development(mut self, development: bool) -> Self {
        self.development = development;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// A single connection that never idles out: the data lives only as long
    /// as that connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            in_memory: true,
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            ensure_schema: true,
            table_prefix: TablePrefix::default(),
            development: false,
        }
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.in_memory {
            "sqlite::memory:"
                .parse::<SqliteConnectOptions>()
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                // Readers don't block writers, writers don't block readers
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
        };

        Ok(options.foreign_keys(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access.
///
/// Cheap to clone: the pool and the resolved table names are shared.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./ledger.db")).await?;
/// let invoice = db.invoices().get(7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    tables: Arc<Tables>,
    development: bool,
}

impl Database {
    /// Opens the connection pool.
    ///
    /// ## What This Does
    /// 1. Creates the database file if it doesn't exist
    /// 2. Configures SQLite (WAL, NORMAL synchronous, foreign keys)
    /// 3. Creates the connection pool
    /// 4. Creates missing ledger tables (if `ensure_schema` is set)
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            prefix = %config.table_prefix,
            development = config.development,
            "Initializing database connection"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(None::<Duration>)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Database pool created");

        let db = Database {
            pool,
            tables: Arc::new(Tables::new(&config.table_prefix)),
            development: config.development,
        };

        if config.ensure_schema {
            migrations::ensure_schema(&db.pool, &db.tables).await?;
        }

        Ok(db)
    }

    /// Explicit (re-)initialization, as run by `database initialize`.
    ///
    /// Idempotent, except in development mode where the ledger tables are
    /// dropped and recreated empty.
    pub async fn initialize(&self) -> DbResult<()> {
        migrations::initialize(&self.pool, &self.tables, self.development).await
    }

    /// Which ledger tables currently exist.
    pub async fn schema_status(&self) -> DbResult<SchemaStatus> {
        migrations::schema_status(&self.pool, &self.tables).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Resolved (prefixed) table names.
    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn is_development(&self) -> bool {
        self.development
    }

    /// Returns the customer repository.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone(), Arc::clone(&self.tables))
    }

    /// Returns the creditor repository.
    pub fn creditors(&self) -> CreditorRepository {
        CreditorRepository::new(self.pool.clone(), Arc::clone(&self.tables))
    }

    /// Returns the creditor payment account repository.
    pub fn payment_accounts(&self) -> PaymentAccountRepository {
        PaymentAccountRepository::new(self.pool.clone(), Arc::clone(&self.tables))
    }

    /// Returns the invoice repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let invoices = db.invoices().list().await?;
    /// ```
    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone(), Arc::clone(&self.tables))
    }

    /// Closes the database connection pool.
    ///
    /// After calling close, all repository operations will fail.
    pub async fn close(&self) {
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        db.close().await;
        assert!(!db.health_check().await);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .development(true);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(config.development);
        assert_eq!(config.table_prefix.as_str(), DEFAULT_TABLE_PREFIX);
    }

    #[test]
    fn test_table_prefix_validation() {
        assert!(TablePrefix::new("").is_ok());
        assert!(TablePrefix::new("Ledger_2024_").is_ok());
        for bad in ["bad-prefix!", "a b", "x;DROP", "å_"] {
            assert!(
                matches!(TablePrefix::new(bad), Err(DbError::InvalidConfig(_))),
                "{bad}"
            );
        }
        assert_eq!(TablePrefix::new("").unwrap().table("customer"), "customer");
    }
}
