//! # Customer Repository
//!
//! Database operations for customers.

use std::sync::Arc;

use arledge_core::validation::NewCustomer;
use arledge_core::Customer;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::migrations::Tables;

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i64,
    name: String,
    email: Option<String>,
    address: Option<String>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            address: row.address,
        }
    }
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    tables: Arc<Tables>,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool, tables: Arc<Tables>) -> Self {
        CustomerRepository { pool, tables }
    }

    /// Inserts a customer and returns it with its generated id.
    pub async fn create(&self, customer: &NewCustomer) -> DbResult<Customer> {
        debug!(name = %customer.name, "Creating customer");

        let result = sqlx::query(&format!(
            "INSERT INTO {} (name, email, address) VALUES (?1, ?2, ?3)",
            self.tables.customer
        ))
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        Ok(Customer {
            id: result.last_insert_rowid(),
            name: customer.name.clone(),
            email: customer.email.clone(),
            address: customer.address.clone(),
        })
    }

    /// All customers, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            "SELECT id, name, email, address FROM {} ORDER BY id",
            self.tables.customer
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    /// Gets a customer by ID.
    ///
    /// ## Errors
    /// `DbError::NotFound` ("Customer not found") for an unknown id.
    pub async fn get(&self, id: i64) -> DbResult<Customer> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT id, name, email, address FROM {} WHERE id = ?1",
            self.tables.customer
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Customer::from)
            .ok_or_else(|| DbError::not_found("Customer", id))
    }
}
