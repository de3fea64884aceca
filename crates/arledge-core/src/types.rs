//! # Domain Types
//!
//! Core domain types of the invoicing ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Creditor     │──►│ PaymentAccount  │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  creditor_id    │   │  id             │       │
//! │  │  name           │   │  type           │   │  name           │       │
//! │  │  default_curr.  │   │  is_default     │   │  email          │       │
//! │  └────────┬────────┘   └─────────────────┘   └────────┬────────┘       │
//! │           │ issues                                     │ billed        │
//! │           ▼                                            ▼               │
//! │  ┌──────────────────────────────────────────────────────────────┐      │
//! │  │  Invoice   header + lines + totals (derived, read-only)      │      │
//! │  │    └── InvoiceLine  quantity × unit_price, vat_rate → net,   │      │
//! │  │                     vat, line_total (derived, read-only)     │      │
//! │  └──────────────────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Derived Fields
//! Line amounts and invoice totals are computed inside the constructors and
//! exposed only through accessors. There is no setter, so they cannot drift
//! from their inputs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::totals::{compute_invoice_totals, compute_line, InvoiceTotals, LineAmounts};
use crate::INVOICE_NUMBER_PREFIX;

// =============================================================================
// Customer
// =============================================================================

/// A party that receives invoices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

// =============================================================================
// Creditor
// =============================================================================

/// The business entity issuing invoices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creditor {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// VAT / organisation number.
    pub tax_id: Option<String>,
    /// Free text printed on invoices.
    pub payment_instructions: Option<String>,
    /// ISO 4217 code used when an invoice names none.
    pub default_currency: String,
    /// Ledger account for bookkeeping exports.
    pub beancount_account: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment Account
// =============================================================================

/// A bank / payment account belonging to a creditor.
///
/// At most one account per creditor has `is_default` set; the repository
/// enforces that when writing.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAccount {
    pub id: i64,
    pub creditor_id: i64,
    /// Account kind, e.g. `bankgiro`, `iban`, `swish`. Named `type` on the wire.
    pub kind: String,
    pub label: Option<String>,
    pub identifier: Option<String>,
    pub bank_name: Option<String>,
    pub currency: Option<String>,
    pub beancount_account: Option<String>,
    pub is_default: bool,
    /// Arbitrary extra attributes (BIC, clearing number, ...).
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Lifecycle state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Being prepared, not yet sent.
    #[default]
    Draft,
    /// Sent to the customer.
    Issued,
    /// Settled.
    Paid,
    /// Withdrawn.
    Cancelled,
}

impl InvoiceStatus {
    /// Wire / storage text.
    pub const fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Issued => "issued",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "issued" => Ok(InvoiceStatus::Issued),
            "paid" => Ok(InvoiceStatus::Paid),
            "cancelled" => Ok(InvoiceStatus::Cancelled),
            other => Err(CoreError::invalid_argument(
                "status",
                format!("unknown invoice status '{other}'"),
            )),
        }
    }
}

// =============================================================================
// Invoice Line
// =============================================================================

/// A line item on an invoice.
///
/// `net`, `vat` and `line_total` are derived in [`InvoiceLine::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    vat_rate: Decimal,
    amounts: LineAmounts,
}

impl InvoiceLine {
    /// Builds a line and derives its amounts.
    ///
    /// ## Example
    /// ```rust
    /// use arledge_core::types::InvoiceLine;
    /// use rust_decimal::Decimal;
    ///
    /// let line = InvoiceLine::new("Consulting", Decimal::from(2), Decimal::new(1000, 2), Decimal::from(25)).unwrap();
    /// assert_eq!(line.line_total().to_string(), "25.00");
    /// ```
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        vat_rate: Decimal,
    ) -> CoreResult<Self> {
        let amounts = compute_line(quantity, unit_price, vat_rate)?;
        Ok(InvoiceLine {
            description: description.into(),
            quantity,
            unit_price,
            vat_rate,
            amounts,
        })
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    #[inline]
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// VAT rate in percent (`25` = 25%).
    #[inline]
    pub fn vat_rate(&self) -> Decimal {
        self.vat_rate
    }

    #[inline]
    pub fn net(&self) -> Decimal {
        self.amounts.net
    }

    #[inline]
    pub fn vat(&self) -> Decimal {
        self.amounts.vat
    }

    #[inline]
    pub fn line_total(&self) -> Decimal {
        self.amounts.line_total
    }

    #[inline]
    pub fn amounts(&self) -> &LineAmounts {
        &self.amounts
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// Header fields of an invoice, everything except lines and totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceHeader {
    pub id: i64,
    pub customer_id: i64,
    pub creditor_id: Option<i64>,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub currency: String,
}

/// An invoice with its lines and derived totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub header: InvoiceHeader,
    lines: Vec<InvoiceLine>,
    totals: InvoiceTotals,
}

impl Invoice {
    /// Assembles an invoice and derives its totals from the lines.
    pub fn new(header: InvoiceHeader, lines: Vec<InvoiceLine>) -> CoreResult<Self> {
        let totals = compute_invoice_totals(lines.iter().map(InvoiceLine::amounts))?;
        Ok(Invoice {
            header,
            lines,
            totals,
        })
    }

    #[inline]
    pub fn id(&self) -> i64 {
        self.header.id
    }

    /// Human-facing number, e.g. `INV-0007`.
    pub fn invoice_number(&self) -> String {
        format!("{}{:04}", INVOICE_NUMBER_PREFIX, self.header.id)
    }

    #[inline]
    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    #[inline]
    pub fn totals(&self) -> &InvoiceTotals {
        &self.totals
    }

    #[inline]
    pub fn subtotal(&self) -> Decimal {
        self.totals.subtotal
    }

    #[inline]
    pub fn total_vat(&self) -> Decimal {
        self.totals.total_vat
    }

    #[inline]
    pub fn total(&self) -> Decimal {
        self.totals.total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn header(id: i64) -> InvoiceHeader {
        InvoiceHeader {
            id,
            customer_id: 1,
            creditor_id: None,
            status: InvoiceStatus::default(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            due_at: None,
            description: None,
            currency: "SEK".to_string(),
        }
    }

    #[test]
    fn test_status_default() {
        assert_eq!(InvoiceStatus::default(), InvoiceStatus::Draft);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(InvoiceStatus::Cancelled.to_string(), "cancelled");
        assert_eq!("Paid".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Paid);
        assert!("void".parse::<InvoiceStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Issued).unwrap(),
            "\"issued\""
        );
    }

    #[test]
    fn test_line_derives_amounts() {
        let line = InvoiceLine::new("Widget", dec!(2), dec!(10.00), dec!(25)).unwrap();
        assert_eq!(line.description(), "Widget");
        assert_eq!(line.net(), dec!(20.00));
        assert_eq!(line.vat(), dec!(5.00));
        assert_eq!(line.line_total(), line.net() + line.vat());
    }

    #[test]
    fn test_invoice_totals() {
        let lines = vec![
            InvoiceLine::new("A", dec!(2), dec!(10.00), dec!(25)).unwrap(),
            InvoiceLine::new("B", dec!(1), dec!(3.33), dec!(12)).unwrap(),
        ];
        let invoice = Invoice::new(header(3), lines).unwrap();
        assert_eq!(invoice.subtotal(), dec!(23.33));
        assert_eq!(invoice.total_vat(), dec!(5.40));
        assert_eq!(invoice.total(), dec!(28.73));
        assert_eq!(invoice.lines().len(), 2);
    }

    #[test]
    fn test_empty_invoice_totals() {
        let invoice = Invoice::new(header(1), Vec::new()).unwrap();
        assert_eq!(invoice.total().to_string(), "0.00");
    }

    #[test]
    fn test_invoice_number_padding() {
        assert_eq!(Invoice::new(header(7), Vec::new()).unwrap().invoice_number(), "INV-0007");
        assert_eq!(
            Invoice::new(header(12345), Vec::new()).unwrap().invoice_number(),
            "INV-12345"
        );
    }
}
