//! # Validation Module
//!
//! The parse-and-validate boundary between loosely typed JSON and the
//! domain types.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Decode (serde)                                               │
//! │  ├── JSON shape, required fields                                       │
//! │  ├── Decimals: string or number only                                   │
//! │  └── Timestamps: ISO-8601 → UTC                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: business rules (names, currency codes)          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Either a typed value comes out, or a tagged error. Never a default.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use arledge_core::validation::{parse_model, NewCustomer};
//!
//! let customer: NewCustomer = parse_model("customer", r#"{"name": "ACME AB"}"#).unwrap();
//! assert_eq!(customer.name, "ACME AB");
//!
//! let err = parse_model::<NewCustomer>("customer", "{not json").unwrap_err();
//! assert!(err.to_string().starts_with("Invalid customer JSON"));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::normalize::{invariant_string_to_decimal, utc_string_to_timestamp};
use crate::types::{InvoiceLine, InvoiceStatus};
use crate::DEFAULT_CURRENCY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a display name.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// Decoding Boundary
// =============================================================================

/// Input models that carry business rules beyond their JSON shape.
pub trait Validate {
    fn validate(&mut self) -> ValidationResult<()>;
}

/// Decodes and validates an input model from JSON text.
///
/// `entity` names the model in the error message
/// (`Invalid customer JSON: ...`).
pub fn parse_model<T>(entity: &str, json: &str) -> CoreResult<T>
where
    T: DeserializeOwned + Validate,
{
    let model = serde_json::from_str(json).map_err(|e| invalid_model(entity, e))?;
    finish(model)
}

/// Same as [`parse_model`] for an already-decoded JSON value.
pub fn parse_model_value<T>(entity: &str, value: Value) -> CoreResult<T>
where
    T: DeserializeOwned + Validate,
{
    let model = serde_json::from_value(value).map_err(|e| invalid_model(entity, e))?;
    finish(model)
}

fn finish<T: Validate>(mut model: T) -> CoreResult<T> {
    model.validate()?;
    Ok(model)
}

fn invalid_model(entity: &str, err: serde_json::Error) -> CoreError {
    CoreError::InvalidModel {
        entity: entity.to_string(),
        reason: err.to_string(),
    }
}

/// Interprets a loosely typed JSON value as a decimal.
///
/// Strings go through the invariant parser; numbers through their shortest
/// decimal text (`0.1` stays `0.1`). Anything else is rejected.
pub fn decimal_from_json(field: &str, value: &Value) -> CoreResult<Decimal> {
    match value {
        Value::String(text) => Ok(invariant_string_to_decimal(text)?),
        Value::Number(number) => Ok(invariant_string_to_decimal(&number.to_string())
            .map_err(|e| CoreError::invalid_argument(field, e.to_string()))?),
        Value::Null => Err(CoreError::invalid_argument(field, "expected a decimal, got null")),
        Value::Bool(_) => Err(CoreError::invalid_argument(
            field,
            "expected a decimal, got a boolean",
        )),
        Value::Array(_) | Value::Object(_) => Err(CoreError::invalid_argument(
            field,
            "expected a decimal, got a structure",
        )),
    }
}

fn de_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_json("decimal", &value).map_err(D::Error::custom)
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(text) => utc_string_to_timestamp(&text)
            .map(Some)
            .map_err(D::Error::custom),
        None => Ok(None),
    }
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// =============================================================================
// Input Models
// =============================================================================

/// Input for creating a customer.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewCustomer {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl Validate for NewCustomer {
    fn validate(&mut self) -> ValidationResult<()> {
        self.name = validate_name(&self.name)?;
        Ok(())
    }
}

/// Input for creating a creditor.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewCreditor {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub payment_instructions: Option<String>,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default)]
    pub beancount_account: Option<String>,
    /// Defaults to the time of creation.
    #[serde(default, deserialize_with = "de_timestamp")]
    #[schemars(with = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Validate for NewCreditor {
    fn validate(&mut self) -> ValidationResult<()> {
        self.name = validate_name(&self.name)?;
        self.default_currency = validate_currency_code(&self.default_currency)?;
        Ok(())
    }
}

/// Input for creating a creditor payment account.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewPaymentAccount {
    pub creditor_id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub beancount_account: Option<String>,
    /// Makes this the creditor's only default account.
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, deserialize_with = "de_timestamp")]
    #[schemars(with = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Validate for NewPaymentAccount {
    fn validate(&mut self) -> ValidationResult<()> {
        let kind = self.kind.trim();
        if kind.is_empty() {
            return Err(ValidationError::Required {
                field: "type".to_string(),
            });
        }
        self.kind = kind.to_string();

        if let Some(currency) = &self.currency {
            self.currency = Some(validate_currency_code(currency)?);
        }
        Ok(())
    }
}

/// Input for one invoice line.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewInvoiceLine {
    pub description: String,
    #[serde(default = "default_quantity", deserialize_with = "de_decimal")]
    #[schemars(with = "String")]
    pub quantity: Decimal,
    #[serde(deserialize_with = "de_decimal")]
    #[schemars(with = "String")]
    pub unit_price: Decimal,
    /// Percent, `25` = 25%.
    #[serde(default, deserialize_with = "de_decimal")]
    #[schemars(with = "String")]
    pub vat_rate: Decimal,
}

impl NewInvoiceLine {
    /// Builds the domain line, deriving its amounts.
    pub fn to_line(&self) -> CoreResult<InvoiceLine> {
        InvoiceLine::new(
            self.description.clone(),
            self.quantity,
            self.unit_price,
            self.vat_rate,
        )
    }
}

/// Input for creating an invoice with its lines.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NewInvoice {
    pub customer_id: i64,
    #[serde(default)]
    pub creditor_id: Option<i64>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default, deserialize_with = "de_timestamp")]
    #[schemars(with = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    #[schemars(with = "Option<String>")]
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub lines: Vec<NewInvoiceLine>,
}

impl Validate for NewInvoice {
    fn validate(&mut self) -> ValidationResult<()> {
        self.currency = validate_currency_code(&self.currency)?;
        Ok(())
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer or creditor name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters
///
/// ## Returns
/// The trimmed name.
///
/// ## Example
/// ```rust
/// use arledge_core::validation::validate_name;
///
/// assert_eq!(validate_name("  ACME AB ").unwrap(), "ACME AB");
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Validates an ISO 4217 style currency code and upper-cases it.
///
/// ## Example
/// ```rust
/// use arledge_core::validation::validate_currency_code;
///
/// assert_eq!(validate_currency_code("sek").unwrap(), "SEK");
/// assert!(validate_currency_code("KRONOR").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be three ASCII letters".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================
