//! # Invoice Repository
//!
//! Database operations for invoices and their lines.
//!
//! ## Storage Round Trip
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WRITE                                  READ                            │
//! │                                                                         │
//! │  unit_price 19.995 ──round half-up──►  2000 (cents)  ──► 20.00          │
//! │  quantity   2.5    ──invariant text──► "2.5"         ──► 2.5            │
//! │  vat_rate   25     ──invariant text──► "25"          ──► 25             │
//! │  created_at ──────── UTC, "Z" ───────► "2024-01-15T09:00:00Z"           │
//! │                                                                         │
//! │  Totals are never stored; they are derived from the lines on read.     │
//! │  `create` derives them from the *stored* unit prices, so the invoice   │
//! │  it returns equals what `get` returns later.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use arledge_core::money::{from_minor_units, to_minor_units};
use arledge_core::normalize::{format_invariant, invariant_string_to_decimal};
use arledge_core::validation::NewInvoice;
use arledge_core::{
    Invoice, InvoiceHeader, InvoiceLine, InvoiceStatus, ParseError, DEFAULT_CURRENCY,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{read_optional_timestamp, read_timestamp, timestamp_text};
use crate::error::{DbError, DbResult};
use crate::migrations::Tables;

const HEADER_COLUMNS: &str =
    "id, customer_id, creditor_id, status, created_at, due_at, description, currency";

const LINE_COLUMNS: &str = "id, invoice_id, description, quantity, unit_price, vat_rate";

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    customer_id: i64,
    creditor_id: Option<i64>,
    status: InvoiceStatus,
    created_at: String,
    due_at: Option<String>,
    description: Option<String>,
    currency: Option<String>,
}

impl InvoiceRow {
    fn into_header(self, table: &str) -> DbResult<InvoiceHeader> {
        Ok(InvoiceHeader {
            id: self.id,
            customer_id: self.customer_id,
            creditor_id: self.creditor_id,
            status: self.status,
            created_at: read_timestamp(table, self.id, &self.created_at)?,
            due_at: read_optional_timestamp(table, self.id, self.due_at.as_deref())?,
            description: self.description,
            currency: self
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceLineRow {
    id: i64,
    invoice_id: i64,
    description: String,
    quantity: String,
    unit_price: i64,
    vat_rate: String,
}

impl InvoiceLineRow {
    fn into_line(self, table: &str) -> DbResult<InvoiceLine> {
        let corrupt = |e: ParseError| DbError::corrupt(table, self.id, e);
        let quantity = invariant_string_to_decimal(&self.quantity).map_err(corrupt)?;
        let vat_rate = invariant_string_to_decimal(&self.vat_rate).map_err(corrupt)?;
        let unit_price = from_minor_units(self.unit_price);

        InvoiceLine::new(self.description, quantity, unit_price, vat_rate)
            .map_err(|e| DbError::corrupt(table, self.id, e))
    }
}

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
    tables: Arc<Tables>,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool, tables: Arc<Tables>) -> Self {
        InvoiceRepository { pool, tables }
    }

    /// Inserts the header and all lines in one transaction.
    ///
    /// Unit prices are stored as minor units; the returned invoice carries
    /// the stored (two-digit) prices and the totals derived from them.
    ///
    /// ## Errors
    /// - `DbError::Core` if a line overflows before anything is written
    /// - constraint / query errors roll the whole invoice back
    pub async fn create(&self, invoice: &NewInvoice) -> DbResult<Invoice> {
        let created_at = invoice.created_at.unwrap_or_else(Utc::now);

        // Everything that can fail without the database is done up front.
        let mut lines = Vec::with_capacity(invoice.lines.len());
        let mut minor_prices = Vec::with_capacity(invoice.lines.len());
        for line in &invoice.lines {
            let minor = to_minor_units(line.unit_price)?;
            lines.push(InvoiceLine::new(
                line.description.clone(),
                line.quantity,
                from_minor_units(minor),
                line.vat_rate,
            )?);
            minor_prices.push(minor);
        }

        debug!(
            customer_id = invoice.customer_id,
            lines = lines.len(),
            "Creating invoice"
        );

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(&format!(
            "INSERT INTO {} (customer_id, status, created_at, due_at, description, creditor_id, currency) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            self.tables.invoice
        ))
        .bind(invoice.customer_id)
        .bind(invoice.status)
        .bind(timestamp_text(&created_at))
        .bind(invoice.due_at.as_ref().map(timestamp_text))
        .bind(&invoice.description)
        .bind(invoice.creditor_id)
        .bind(&invoice.currency)
        .execute(&mut *tx)
        .await?;
        let invoice_id = result.last_insert_rowid();

        let insert_line = format!(
            "INSERT INTO {} (invoice_id, description, quantity, unit_price, vat_rate) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            self.tables.invoice_line
        );
        for (line, minor) in lines.iter().zip(&minor_prices) {
            sqlx::query(&insert_line)
                .bind(invoice_id)
                .bind(line.description())
                .bind(format_invariant(line.quantity()))
                .bind(*minor)
                .bind(format_invariant(line.vat_rate()))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(invoice_id, "Invoice created");

        let header = InvoiceHeader {
            id: invoice_id,
            customer_id: invoice.customer_id,
            creditor_id: invoice.creditor_id,
            status: invoice.status,
            created_at,
            due_at: invoice.due_at,
            description: invoice.description.clone(),
            currency: invoice.currency.clone(),
        };
        Ok(Invoice::new(header, lines)?)
    }

    /// All invoices, newest first, each with its lines and totals.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {HEADER_COLUMNS} FROM {} ORDER BY id DESC",
            self.tables.invoice
        ))
        .fetch_all(&self.pool)
        .await?;

        let line_rows: Vec<InvoiceLineRow> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM {} ORDER BY invoice_id, id",
            self.tables.invoice_line
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_invoice: HashMap<i64, Vec<InvoiceLine>> = HashMap::new();
        for row in line_rows {
            let invoice_id = row.invoice_id;
            let line = row.into_line(&self.tables.invoice_line)?;
            lines_by_invoice.entry(invoice_id).or_default().push(line);
        }

        rows.into_iter()
            .map(|row| {
                let lines = lines_by_invoice.remove(&row.id).unwrap_or_default();
                self.assemble(row, lines)
            })
            .collect()
    }

    /// Gets an invoice with its lines.
    ///
    /// ## Errors
    /// `DbError::NotFound` ("Invoice not found") for an unknown id.
    pub async fn get(&self, id: i64) -> DbResult<Invoice> {
        let row: Option<InvoiceRow> = sqlx::query_as(&format!(
            "SELECT {HEADER_COLUMNS} FROM {} WHERE id = ?1",
            self.tables.invoice
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let row = row.ok_or_else(|| DbError::not_found("Invoice", id))?;

        let line_rows: Vec<InvoiceLineRow> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM {} WHERE invoice_id = ?1 ORDER BY id",
            self.tables.invoice_line
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let lines = line_rows
            .into_iter()
            .map(|r| r.into_line(&self.tables.invoice_line))
            .collect::<DbResult<Vec<_>>>()?;

        self.assemble(row, lines)
    }

    fn assemble(&self, row: InvoiceRow, lines: Vec<InvoiceLine>) -> DbResult<Invoice> {
        let id = row.id;
        let header = row.into_header(&self.tables.invoice)?;
        Invoice::new(header, lines).map_err(|e| DbError::corrupt(self.tables.invoice.as_str(), id, e))
    }
}
