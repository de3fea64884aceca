//! JSON Schema of the input models, for callers that build models
//! programmatically (`arledge schema invoice`, `--json-schema`).

use std::fmt;
use std::str::FromStr;

use schemars::schema_for;
use serde_json::Value;

use crate::error::CoreError;
use crate::validation::{NewCreditor, NewCustomer, NewInvoice, NewInvoiceLine, NewPaymentAccount};

/// Models that have a published schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaName {
    Customer,
    Creditor,
    PaymentAccount,
    Invoice,
    InvoiceLine,
}

impl SchemaName {
    pub const ALL: [SchemaName; 5] = [
        SchemaName::Customer,
        SchemaName::Creditor,
        SchemaName::PaymentAccount,
        SchemaName::Invoice,
        SchemaName::InvoiceLine,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SchemaName::Customer => "customer",
            SchemaName::Creditor => "creditor",
            SchemaName::PaymentAccount => "payment-account",
            SchemaName::Invoice => "invoice",
            SchemaName::InvoiceLine => "invoice-line",
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaName {
    type Err = CoreError;

    /// `account` is accepted as a short form of `payment-account`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(SchemaName::Customer),
            "creditor" => Ok(SchemaName::Creditor),
            "account" | "payment-account" | "payment_account" => Ok(SchemaName::PaymentAccount),
            "invoice" => Ok(SchemaName::Invoice),
            "invoice-line" | "invoice_line" | "line" => Ok(SchemaName::InvoiceLine),
            _ => Err(CoreError::invalid_argument("schema", "Unknown schema name")),
        }
    }
}

/// Returns the JSON Schema of the named input model.
pub fn schema_for(name: SchemaName) -> Value {
    let schema = match name {
        SchemaName::Customer => schema_for!(NewCustomer),
        SchemaName::Creditor => schema_for!(NewCreditor),
        SchemaName::PaymentAccount => schema_for!(NewPaymentAccount),
        SchemaName::Invoice => schema_for!(NewInvoice),
        SchemaName::InvoiceLine => schema_for!(NewInvoiceLine),
    };
    // RootSchema only holds strings, maps and numbers.
    serde_json::to_value(schema).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("account".parse::<SchemaName>().unwrap(), SchemaName::PaymentAccount);
        assert_eq!("Invoice".parse::<SchemaName>().unwrap(), SchemaName::Invoice);
        let err = "ledger".parse::<SchemaName>().unwrap_err();
        assert!(err.to_string().contains("Unknown schema name"));
    }

    #[test]
    fn test_every_schema_has_properties() {
        for name in SchemaName::ALL {
            let schema = schema_for(name);
            assert!(schema.get("properties").is_some(), "{name}");
        }
    }

    #[test]
    fn test_invoice_schema_fields() {
        let schema = schema_for(SchemaName::Invoice);
        let properties = &schema["properties"];
        assert!(properties.get("customer_id").is_some());
        assert!(properties.get("lines").is_some());
        let required = schema["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "customer_id"));
    }

    #[test]
    fn test_payment_account_schema_uses_type() {
        let schema = schema_for(SchemaName::PaymentAccount);
        assert!(schema["properties"].get("type").is_some());
        assert!(schema["properties"].get("kind").is_none());
    }
}
