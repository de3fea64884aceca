//! # arledge-core: Pure Business Logic for the arledge Ledger
//!
//! Money policy, value normalization, invoice totals, domain types and the
//! input validation boundary. No I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        arledge Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │        arledge CLI            │        MCP tool server           │   │
//! │  │   customer / invoice / ...    │   tools/call over stdio          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ shared command layer                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ arledge-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ normalize │  │  totals   │  │   types   │  │ validation│  │   │
//! │  │   │ money     │  │  line /   │  │  Invoice  │  │ New* input│  │   │
//! │  │   │ document  │  │  invoice  │  │  Creditor │  │  models   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  arledge-db (Database Layer)                    │   │
//! │  │       SQLite tables, minor-unit storage, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Quantization policy and minor-unit conversion
//! - [`normalize`] - Invariant decimal / UTC timestamp text forms
//! - [`totals`] - Line and invoice totals (two-stage rounding)
//! - [`types`] - Domain types (Customer, Creditor, Invoice, ...)
//! - [`validation`] - Input models and business rule validation
//! - [`document`] - Output documents and `serialize_deep`
//! - [`schema`] - JSON Schema of the input models
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use arledge_core::types::InvoiceLine;
//! use arledge_core::normalize::format_currency;
//! use rust_decimal::Decimal;
//!
//! let line = InvoiceLine::new("Hosting", Decimal::from(3), Decimal::new(3333, 2), Decimal::from(25)).unwrap();
//!
//! // 3 × 33.33 = 99.99, VAT 25% = 24.9975 → 25.00
//! assert_eq!(format_currency(line.vat()), "25.00");
//! assert_eq!(format_currency(line.line_total()), "124.99");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod document;
pub mod error;
pub mod money;
pub mod normalize;
pub mod schema;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use document::{serialize_deep, Document, ToDocument};
pub use error::{CoreError, CoreResult, ParseError, ValidationError};
pub use totals::{InvoiceTotals, LineAmounts};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Currency used when a creditor or invoice names none.
pub const DEFAULT_CURRENCY: &str = "SEK";

/// Prefix of human-facing invoice numbers (`INV-0007`).
pub const INVOICE_NUMBER_PREFIX: &str = "INV-";
