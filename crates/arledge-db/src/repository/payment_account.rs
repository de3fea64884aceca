//! # Payment Account Repository
//!
//! Inbound payment accounts of a creditor (bank, bankgiro, PayPal, ...).
//!
//! ## Default Account
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(is_default = true)                                             │
//! │     BEGIN                                                               │
//! │       UPDATE ... SET is_default = 0 WHERE creditor_id = ?              │
//! │       INSERT ... is_default = 1                                        │
//! │     COMMIT                                                              │
//! │                                                                         │
//! │  → at most one default per creditor, never zero-then-one visible       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use arledge_core::validation::NewPaymentAccount;
use arledge_core::PaymentAccount;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use super::{read_timestamp, timestamp_text};
use crate::error::{DbError, DbResult};
use crate::migrations::Tables;

const COLUMNS: &str = "id, creditor_id, type, label, identifier, bank_name, currency, \
                       beancount_account, is_default, metadata, created_at";

#[derive(Debug, sqlx::FromRow)]
struct PaymentAccountRow {
    id: i64,
    creditor_id: i64,
    #[sqlx(rename = "type")]
    kind: String,
    label: Option<String>,
    identifier: Option<String>,
    bank_name: Option<String>,
    currency: Option<String>,
    beancount_account: Option<String>,
    is_default: bool,
    metadata: Option<String>,
    created_at: String,
}

impl PaymentAccountRow {
    fn into_account(self, table: &str) -> DbResult<PaymentAccount> {
        let created_at = read_timestamp(table, self.id, &self.created_at)?;
        let metadata = decode_metadata(self.id, self.metadata.as_deref());
        Ok(PaymentAccount {
            id: self.id,
            creditor_id: self.creditor_id,
            kind: self.kind,
            label: self.label,
            identifier: self.identifier,
            bank_name: self.bank_name,
            currency: self.currency,
            beancount_account: self.beancount_account,
            is_default: self.is_default,
            metadata,
            created_at,
        })
    }
}

/// Unreadable or non-object metadata reads back as an empty object.
fn decode_metadata(id: i64, text: Option<&str>) -> Map<String, Value> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Map::new();
    };

    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        Ok(_) | Err(_) => {
            warn!(account_id = id, "Ignoring corrupt payment account metadata");
            Map::new()
        }
    }
}

/// Repository for creditor payment accounts.
#[derive(Debug, Clone)]
pub struct PaymentAccountRepository {
    pool: SqlitePool,
    tables: Arc<Tables>,
}

impl PaymentAccountRepository {
    /// Creates a new PaymentAccountRepository.
    pub fn new(pool: SqlitePool, tables: Arc<Tables>) -> Self {
        PaymentAccountRepository { pool, tables }
    }

    /// Inserts an account. Setting `is_default` clears the flag on the
    /// creditor's other accounts in the same transaction.
    pub async fn create(&self, account: &NewPaymentAccount) -> DbResult<PaymentAccount> {
        let table = &self.tables.payment_account;
        let created_at = account.created_at.unwrap_or_else(Utc::now);
        let metadata = serde_json::to_string(&account.metadata)
            .map_err(|e| DbError::Internal(e.to_string()))?;

        debug!(
            creditor_id = account.creditor_id,
            kind = %account.kind,
            is_default = account.is_default,
            "Creating payment account"
        );

        let mut tx = self.pool.begin().await?;

        if account.is_default {
            sqlx::query(&format!(
                "UPDATE {table} SET is_default = 0 WHERE creditor_id = ?1"
            ))
            .bind(account.creditor_id)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query(&format!(
            "INSERT INTO {table} (creditor_id, type, label, identifier, bank_name, currency, \
             beancount_account, is_default, metadata, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ))
        .bind(account.creditor_id)
        .bind(&account.kind)
        .bind(&account.label)
        .bind(&account.identifier)
        .bind(&account.bank_name)
        .bind(&account.currency)
        .bind(&account.beancount_account)
        .bind(account.is_default)
        .bind(metadata)
        .bind(timestamp_text(&created_at))
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get(result.last_insert_rowid()).await
    }

    /// Accounts ordered by id, optionally only those of one creditor.
    pub async fn list(&self, creditor_id: Option<i64>) -> DbResult<Vec<PaymentAccount>> {
        let table = &self.tables.payment_account;
        let rows: Vec<PaymentAccountRow> = match creditor_id {
            Some(creditor_id) => {
                sqlx::query_as(&format!(
                    "SELECT {COLUMNS} FROM {table} WHERE creditor_id = ?1 ORDER BY id"
                ))
                .bind(creditor_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT {COLUMNS} FROM {table} ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(|row| row.into_account(table)).collect()
    }

    /// Gets an account by ID.
    pub async fn get(&self, id: i64) -> DbResult<PaymentAccount> {
        let table = &self.tables.payment_account;
        let row: Option<PaymentAccountRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM {table} WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or_else(|| DbError::not_found("Payment account", id))?
            .into_account(table)
    }

    /// The creditor's default account, if one is flagged.
    pub async fn default_for(&self, creditor_id: i64) -> DbResult<Option<PaymentAccount>> {
        let table = &self.tables.payment_account;
        let row: Option<PaymentAccountRow> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM {table} WHERE creditor_id = ?1 AND is_default = 1 \
             ORDER BY id LIMIT 1"
        ))
        .bind(creditor_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account(table)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_metadata() {
        assert_eq!(decode_metadata(1, None), Map::new());
        assert_eq!(decode_metadata(1, Some("")), Map::new());
        assert_eq!(decode_metadata(1, Some("not json")), Map::new());
        assert_eq!(decode_metadata(1, Some("[1, 2]")), Map::new());

        let map = decode_metadata(1, Some(r#"{"bic": "ESSESESS"}"#));
        assert_eq!(map.get("bic"), Some(&json!("ESSESESS")));
    }
}
