//! # arledge-db: Database Layer for the arledge Ledger
//!
//! SQLite persistence for customers, creditors, payment accounts and
//! invoices, using sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        arledge Data Flow                                │
//! │                                                                         │
//! │  CLI command / MCP tool (invoice create)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     arledge-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (invoice.rs)  │    │ (prefixed    │  │   │
//! │  │   │               │    │               │    │  tables)     │  │   │
//! │  │   │ SqlitePool    │    │ CustomerRepo  │    │ CREATE IF    │  │   │
//! │  │   │ TablePrefix   │◄───│ InvoiceRepo   │    │ NOT EXISTS   │  │   │
//! │  │   │ development   │    │ ...           │    │ ensure_column│  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (./ledger.db)               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration, table prefix
//! - [`migrations`] - Table creation and additive upgrades
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arledge_db::{Database, DbConfig, TablePrefix};
//!
//! let config = DbConfig::new("ledger.db").table_prefix(TablePrefix::new("arledge_")?);
//! let db = Database::new(config).await?;
//!
//! let invoice = db.invoices().get(7).await?;
//! println!("{} {}", invoice.invoice_number(), invoice.total());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use migrations::{SchemaStatus, Tables};
pub use pool::{Database, DbConfig, TablePrefix, DEFAULT_TABLE_PREFIX};

// Repository re-exports for convenience
pub use repository::creditor::CreditorRepository;
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::payment_account::PaymentAccountRepository;
