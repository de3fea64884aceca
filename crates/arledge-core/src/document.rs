//! # Output Documents
//!
//! Every document leaving the ledger (CLI stdout, export files, tool
//! responses) is built as a [`Document`] tree and rendered by
//! [`serialize_deep`], the one place decimals and timestamps become text.
//!
//! ```text
//!   Invoice ──to_document()──► Document::Map ──serialize_deep()──► JSON
//!                                  │
//!                                  ├── Money(22.50)       → "22.50"
//!                                  ├── Decimal(2.5)       → "2.5"
//!                                  ├── Timestamp(...)     → "2024-01-15T09:00:00Z"
//!                                  └── Integer / Text ... → unchanged
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::normalize::{format_currency, format_invariant, format_utc};
use crate::types::{Creditor, Customer, Invoice, InvoiceLine, PaymentAccount};

/// A JSON-like tree whose leaves still carry their domain meaning.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
    /// Rendered with the invariant policy.
    Decimal(Decimal),
    /// Rendered with the currency policy (two digits).
    Money(Decimal),
    Timestamp(DateTime<Utc>),
    /// Already-plain JSON (e.g. free-form metadata).
    Json(Value),
    List(Vec<Document>),
    Map(Vec<(String, Document)>),
}

impl Document {
    /// Starts an ordered map.
    pub fn map() -> MapBuilder {
        MapBuilder(Vec::new())
    }
}

impl From<&str> for Document {
    fn from(value: &str) -> Self {
        Document::Text(value.to_string())
    }
}

impl From<String> for Document {
    fn from(value: String) -> Self {
        Document::Text(value)
    }
}

impl From<i64> for Document {
    fn from(value: i64) -> Self {
        Document::Integer(value)
    }
}

impl From<bool> for Document {
    fn from(value: bool) -> Self {
        Document::Bool(value)
    }
}

impl From<DateTime<Utc>> for Document {
    fn from(value: DateTime<Utc>) -> Self {
        Document::Timestamp(value)
    }
}

impl<T: Into<Document>> From<Option<T>> for Document {
    fn from(value: Option<T>) -> Self {
        value.map_or(Document::Null, Into::into)
    }
}

/// Builder for [`Document::Map`] keeping insertion order.
#[derive(Debug, Default)]
pub struct MapBuilder(Vec<(String, Document)>);

impl MapBuilder {
    pub fn field(mut self, key: &str, value: impl Into<Document>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    pub fn build(self) -> Document {
        Document::Map(self.0)
    }
}

/// Types that can be rendered as an output document.
pub trait ToDocument {
    fn to_document(&self) -> Document;
}

impl<T: ToDocument> ToDocument for [T] {
    fn to_document(&self) -> Document {
        Document::List(self.iter().map(ToDocument::to_document).collect())
    }
}

impl<T: ToDocument> ToDocument for Vec<T> {
    fn to_document(&self) -> Document {
        self.as_slice().to_document()
    }
}

/// Renders a document to JSON, stringifying decimal and timestamp leaves.
///
/// ## Example
/// ```rust
/// use arledge_core::document::{serialize_deep, Document};
/// use rust_decimal::Decimal;
///
/// let doc = Document::map()
///     .field("total", Document::Money(Decimal::new(225, 1)))
///     .field("qty", Document::Decimal(Decimal::new(25, 1)))
///     .build();
/// assert_eq!(serialize_deep(&doc), serde_json::json!({"total": "22.50", "qty": "2.5"}));
/// ```
pub fn serialize_deep(document: &Document) -> Value {
    match document {
        Document::Null => Value::Null,
        Document::Bool(b) => Value::Bool(*b),
        Document::Integer(i) => Value::from(*i),
        Document::Text(s) => Value::String(s.clone()),
        Document::Decimal(d) => Value::String(format_invariant(*d)),
        Document::Money(d) => Value::String(format_currency(*d)),
        Document::Timestamp(t) => Value::String(format_utc(t)),
        Document::Json(v) => v.clone(),
        Document::List(items) => Value::Array(items.iter().map(serialize_deep).collect()),
        Document::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.clone(), serialize_deep(value));
            }
            Value::Object(map)
        }
    }
}

// =============================================================================
// Domain Documents
// =============================================================================

impl ToDocument for Customer {
    fn to_document(&self) -> Document {
        Document::map()
            .field("id", self.id)
            .field("name", self.name.as_str())
            .field("email", self.email.clone())
            .field("address", self.address.clone())
            .build()
    }
}

impl ToDocument for Creditor {
    fn to_document(&self) -> Document {
        Document::map()
            .field("id", self.id)
            .field("name", self.name.as_str())
            .field("address", self.address.clone())
            .field("email", self.email.clone())
            .field("phone", self.phone.clone())
            .field("tax_id", self.tax_id.clone())
            .field("payment_instructions", self.payment_instructions.clone())
            .field("default_currency", self.default_currency.as_str())
            .field("beancount_account", self.beancount_account.clone())
            .field("created_at", self.created_at)
            .build()
    }
}

impl ToDocument for PaymentAccount {
    fn to_document(&self) -> Document {
        Document::map()
            .field("id", self.id)
            .field("creditor_id", self.creditor_id)
            .field("type", self.kind.as_str())
            .field("label", self.label.clone())
            .field("identifier", self.identifier.clone())
            .field("bank_name", self.bank_name.clone())
            .field("currency", self.currency.clone())
            .field("beancount_account", self.beancount_account.clone())
            .field("is_default", self.is_default)
            .field("metadata", Document::Json(Value::Object(self.metadata.clone())))
            .field("created_at", self.created_at)
            .build()
    }
}

impl ToDocument for InvoiceLine {
    fn to_document(&self) -> Document {
        Document::map()
            .field("description", self.description())
            .field("quantity", Document::Decimal(self.quantity()))
            .field("unit_price", Document::Money(self.unit_price()))
            .field("vat_rate", Document::Decimal(self.vat_rate()))
            .field("net", Document::Money(self.net()))
            .field("vat", Document::Money(self.vat()))
            .field("line_total", Document::Money(self.line_total()))
            .build()
    }
}

impl ToDocument for Invoice {
    fn to_document(&self) -> Document {
        let header = &self.header;
        Document::map()
            .field("id", header.id)
            .field("invoice_number", self.invoice_number())
            .field("customer_id", header.customer_id)
            .field("creditor_id", header.creditor_id)
            .field("status", header.status.as_str())
            .field("created_at", header.created_at)
            .field("due_at", header.due_at)
            .field("description", header.description.clone())
            .field("currency", header.currency.as_str())
            .field("lines", self.lines().to_document())
            .field("subtotal", Document::Money(self.subtotal()))
            .field("total_vat", Document::Money(self.total_vat()))
            .field("total", Document::Money(self.total()))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InvoiceHeader, InvoiceStatus};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample_invoice() -> Invoice {
        let header = InvoiceHeader {
            id: 7,
            customer_id: 2,
            creditor_id: Some(1),
            status: InvoiceStatus::Issued,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            due_at: None,
            description: Some("January".to_string()),
            currency: "SEK".to_string(),
        };
        let lines = vec![InvoiceLine::new("Hours", dec!(2.5), dec!(10), dec!(25)).unwrap()];
        Invoice::new(header, lines).unwrap()
    }

    #[test]
    fn test_invoice_document() {
        let value = serialize_deep(&sample_invoice().to_document());
        assert_eq!(
            value,
            json!({
                "id": 7,
                "invoice_number": "INV-0007",
                "customer_id": 2,
                "creditor_id": 1,
                "status": "issued",
                "created_at": "2024-01-15T09:00:00Z",
                "due_at": null,
                "description": "January",
                "currency": "SEK",
                "lines": [{
                    "description": "Hours",
                    "quantity": "2.5",
                    "unit_price": "10.00",
                    "vat_rate": "25",
                    "net": "25.00",
                    "vat": "6.25",
                    "line_total": "31.25"
                }],
                "subtotal": "25.00",
                "total_vat": "6.25",
                "total": "31.25"
            })
        );
    }

    #[test]
    fn test_leaves_pass_through() {
        let doc = Document::List(vec![
            Document::Null,
            Document::Bool(true),
            Document::Integer(-3),
            Document::Text("x".into()),
            Document::Json(json!({"nested": [1, 2]})),
        ]);
        assert_eq!(
            serialize_deep(&doc),
            json!([null, true, -3, "x", {"nested": [1, 2]}])
        );
    }

    #[test]
    fn test_empty_list() {
        let customers: Vec<Customer> = Vec::new();
        assert_eq!(serialize_deep(&customers.to_document()), json!([]));
    }

    #[test]
    fn test_payment_account_uses_type_key() {
        let account = PaymentAccount {
            id: 1,
            creditor_id: 1,
            kind: "iban".to_string(),
            label: None,
            identifier: Some("SE00".to_string()),
            bank_name: None,
            currency: None,
            beancount_account: None,
            is_default: true,
            metadata: Map::new(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        let value = serialize_deep(&account.to_document());
        assert_eq!(value["type"], "iban");
        assert_eq!(value["metadata"], json!({}));
        assert_eq!(value["created_at"], "2024-01-01T00:00:00Z");
    }
}
