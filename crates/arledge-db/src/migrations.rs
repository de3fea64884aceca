//! # Schema Management
//!
//! Creates the prefixed ledger tables and upgrades older databases in place.
//!
//! ## How Initialization Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Initialization Process                             │
//! │                                                                         │
//! │  Database::initialize()                                                │
//! │       │                                                                 │
//! │       ├── development? DROP every ledger table (destructive)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CREATE TABLE IF NOT EXISTS  <prefix>customer                          │
//! │                              <prefix>creditor                          │
//! │                              <prefix>creditor_payment_account          │
//! │                              <prefix>invoice                           │
//! │                              <prefix>invoice_line                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ensure_column(invoice, creditor_id)   ← databases created before      │
//! │  ensure_column(invoice, currency)        creditors existed             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Formats
//! - unit prices: INTEGER minor units (cents)
//! - quantities, VAT rates: TEXT, invariant decimal
//! - timestamps: TEXT, ISO-8601 UTC with `Z`
//!
//! Changes to existing tables must be additive (`ensure_column`), never
//! rewrites of the CREATE statements.

use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::TablePrefix;

// =============================================================================
// Table Names
// =============================================================================

/// Prefixed names of the ledger tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub customer: String,
    pub creditor: String,
    pub payment_account: String,
    pub invoice: String,
    pub invoice_line: String,
}

impl Tables {
    pub fn new(prefix: &TablePrefix) -> Self {
        Tables {
            customer: prefix.table("customer"),
            creditor: prefix.table("creditor"),
            payment_account: prefix.table("creditor_payment_account"),
            invoice: prefix.table("invoice"),
            invoice_line: prefix.table("invoice_line"),
        }
    }

    /// All tables, children before parents.
    pub fn all(&self) -> [&str; 5] {
        [
            &self.invoice_line,
            &self.invoice,
            &self.payment_account,
            &self.creditor,
            &self.customer,
        ]
    }
}

/// Which ledger tables exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatus {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl SchemaStatus {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

// =============================================================================
// Initialization
// =============================================================================

/// Creates missing tables and columns. Never drops anything.
pub async fn ensure_schema(pool: &SqlitePool, tables: &Tables) -> DbResult<()> {
    let mut tx = pool.begin().await?;

    for statement in create_statements(tables) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::MigrationFailed(e.to_string()))?;
    }

    ensure_column(&mut tx, &tables.invoice, "creditor_id", "INTEGER").await?;
    ensure_column(&mut tx, &tables.invoice, "currency", "TEXT DEFAULT 'SEK'").await?;

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    debug!("Ledger schema ensured");
    Ok(())
}

/// Full initialization: in development mode the ledger tables are dropped
/// first, then [`ensure_schema`] runs.
pub async fn initialize(pool: &SqlitePool, tables: &Tables, development: bool) -> DbResult<()> {
    if development {
        warn!("Development mode: dropping ledger tables");
        drop_tables(pool, tables).await?;
    }

    ensure_schema(pool, tables).await?;

    info!(invoice_table = %tables.invoice, "Ledger schema initialized");
    Ok(())
}

/// Reports which ledger tables exist.
pub async fn schema_status(pool: &SqlitePool, tables: &Tables) -> DbResult<SchemaStatus> {
    let existing: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await?;

    let (present, missing): (Vec<String>, Vec<String>) = tables
        .all()
        .iter()
        .rev()
        .map(|t| t.to_string())
        .partition(|t| existing.contains(t));

    Ok(SchemaStatus { present, missing })
}

async fn drop_tables(pool: &SqlitePool, tables: &Tables) -> DbResult<()> {
    let mut tx = pool.begin().await?;
    for table in tables.all() {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::MigrationFailed(e.to_string()))?;
    }
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(())
}

/// Adds `column` to `table` unless it already exists.
async fn ensure_column(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    definition: &str,
) -> DbResult<()> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(&mut *conn)
        .await?;

    let exists = rows
        .iter()
        .any(|row| row.try_get::<String, _>("name").map_or(false, |name| name == column));

    if !exists {
        info!(table, column, "Adding missing column");
        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"))
            .execute(&mut *conn)
            .await
            .map_err(|e| DbError::MigrationFailed(e.to_string()))?;
    }

    Ok(())
}

fn create_statements(t: &Tables) -> [String; 5] {
    [
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                address TEXT
            )",
            t.customer
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                address TEXT,
                email TEXT,
                phone TEXT,
                tax_id TEXT,
                payment_instructions TEXT,
                default_currency TEXT DEFAULT 'SEK',
                beancount_account TEXT,
                created_at TEXT NOT NULL
            )",
            t.creditor
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                creditor_id INTEGER NOT NULL,
                type TEXT NOT NULL,
                label TEXT,
                identifier TEXT,
                bank_name TEXT,
                currency TEXT,
                beancount_account TEXT,
                is_default INTEGER NOT NULL DEFAULT 0,
                metadata TEXT,
                created_at TEXT NOT NULL
            )",
            t.payment_account
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'draft',
                created_at TEXT NOT NULL,
                due_at TEXT,
                description TEXT,
                creditor_id INTEGER,
                currency TEXT DEFAULT 'SEK'
            )",
            t.invoice
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                invoice_id INTEGER NOT NULL REFERENCES {}(id) ON DELETE CASCADE,
                description TEXT NOT NULL,
                quantity TEXT NOT NULL,
                unit_price INTEGER NOT NULL,
                vat_rate TEXT NOT NULL
            )",
            t.invoice_line, t.invoice
        ),
    ]
}
