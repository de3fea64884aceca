//! # Creditor Repository
//!
//! Database operations for creditors, the entities issuing invoices.

use std::sync::Arc;

use arledge_core::validation::NewCreditor;
use arledge_core::{Creditor, DEFAULT_CURRENCY};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use super::{read_timestamp, timestamp_text};
use crate::error::{DbError, DbResult};
use crate::migrations::Tables;

const COLUMNS: &str = "id, name, address, email, phone, tax_id, payment_instructions, \
                       default_currency, beancount_account, created_at";

#[derive(Debug, sqlx::FromRow)]
struct CreditorRow {
    id: i64,
    name: String,
    address: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    tax_id: Option<String>,
    payment_instructions: Option<String>,
    default_currency: Option<String>,
    beancount_account: Option<String>,
    created_at: String,
}

impl CreditorRow {
    fn into_creditor(self, table: &str) -> DbResult<Creditor> {
        let created_at = read_timestamp(table, self.id, &self.created_at)?;
        Ok(Creditor {
            id: self.id,
            name: self.name,
            address: self.address,
            email: self.email,
            phone: self.phone,
            tax_id: self.tax_id,
            payment_instructions: self.payment_instructions,
            default_currency: self
                .default_currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            beancount_account: self.beancount_account,
            created_at,
        })
    }
}

/// Repository for creditor database operations.
#[derive(Debug, Clone)]
pub struct CreditorRepository {
    pool: SqlitePool,
    tables: Arc<Tables>,
}

impl CreditorRepository {
    /// Creates a new CreditorRepository.
    pub fn new(pool: SqlitePool, tables: Arc<Tables>) -> Self {
        CreditorRepository { pool, tables }
    }

    /// Inserts a creditor. `created_at` defaults to now.
    pub async fn create(&self, creditor: &NewCreditor) -> DbResult<Creditor> {
        let created_at = creditor.created_at.unwrap_or_else(Utc::now);
        debug!(name = %creditor.name, "Creating creditor");

        let result = sqlx::query(&format!(
            "INSERT INTO {} (name, address, email, phone, tax_id, payment_instructions, \
             default_currency, beancount_account, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            self.tables.creditor
        ))
        .bind(&creditor.name)
        .bind(&creditor.address)
        .bind(&creditor.email)
        .bind(&creditor.phone)
        .bind(&creditor.tax_id)
        .bind(&creditor.payment_instructions)
        .bind(&creditor.default_currency)
        .bind(&creditor.beancount_account)
        .bind(timestamp_text(&created_at))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        // Read back so the caller sees exactly what was stored.
        self.get(id).await
    }

    /// All creditors, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Creditor>> {
        let rows: Vec<CreditorRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY id",
            self.tables.creditor
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_creditor(&self.tables.creditor))
            .collect()
    }

    /// Gets a creditor by ID.
    pub async fn get(&self, id: i64) -> DbResult<Creditor> {
        let row: Option<CreditorRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = ?1",
            self.tables.creditor
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| DbError::not_found("Creditor", id))?
            .into_creditor(&self.tables.creditor)
    }
}
