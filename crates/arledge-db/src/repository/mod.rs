//! # Repository Module
//!
//! Database repository implementations for the ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command / MCP tool                                                │
//! │       │                                                                 │
//! │       │  db.invoices().create(model)                                   │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── create(&self, NewInvoice)  → Invoice                              │
//! │  ├── list(&self)                → Vec<Invoice>                         │
//! │  └── get(&self, id)             → Invoice                              │
//! │       │                                                                 │
//! │       │  SQL against <prefix>invoice, <prefix>invoice_line              │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Rows are decoded into private `*Row` structs, then converted to the   │
//! │  domain types through the arledge-core parsers.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers
//! - [`CreditorRepository`](creditor::CreditorRepository) - Creditors
//! - [`PaymentAccountRepository`](payment_account::PaymentAccountRepository) - Creditor payment accounts
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoices and their lines

pub mod creditor;
pub mod customer;
pub mod invoice;
pub mod payment_account;

use arledge_core::normalize::{format_utc, utc_string_to_timestamp};
use chrono::{DateTime, Utc};

use crate::error::{DbError, DbResult};

/// Storage form of a timestamp.
pub(crate) fn timestamp_text(value: &DateTime<Utc>) -> String {
    format_utc(value)
}

/// Reads a stored timestamp back, reporting the row on failure.
pub(crate) fn read_timestamp(table: &str, id: i64, text: &str) -> DbResult<DateTime<Utc>> {
    utc_string_to_timestamp(text).map_err(|e| DbError::corrupt(table, id, e))
}

pub(crate) fn read_optional_timestamp(
    table: &str,
    id: i64,
    text: Option<&str>,
) -> DbResult<Option<DateTime<Utc>>> {
    text.map(|t| read_timestamp(table, id, t)).transpose()
}
