//! # Error Types
//!
//! Domain-specific error types for arledge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  arledge-core errors (this file)                                       │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ParseError       - Malformed decimal / timestamp text             │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  arledge-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  CLI / MCP errors (in app)                                             │
//! │  └── CliError         - What the caller sees (code + message)          │
//! │                                                                         │
//! │  Flow: ParseError → CoreError → DbError → CliError → stderr / MCP      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here ever substitutes a default for bad input: a value that
//! cannot be parsed is reported, never turned into `0`.

use thiserror::Error;

// =============================================================================
// Parse Error
// =============================================================================

/// Malformed text at a conversion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Text is not a fixed-point decimal numeral.
    #[error("invalid decimal '{input}': {reason}")]
    Decimal { input: String, reason: String },

    /// Text is not an ISO-8601 timestamp.
    #[error("invalid timestamp '{input}': {reason}")]
    Timestamp { input: String, reason: String },
}

impl ParseError {
    pub(crate) fn decimal(input: &str, reason: impl Into<String>) -> Self {
        ParseError::Decimal {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn timestamp(input: &str, reason: impl Into<String>) -> Self {
        ParseError::Timestamp {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed decimal or timestamp text.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A value that is not a decimal reached a calculation.
    ///
    /// ## When This Occurs
    /// - A JSON boolean, object or array where a quantity is expected
    /// - A decimal with more precision than can be represented exactly
    #[error("invalid argument for {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// Decimal arithmetic left the representable range.
    #[error("arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },

    /// A JSON input model could not be decoded.
    #[error("Invalid {entity} JSON: {reason}")]
    InvalidModel { entity: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidArgument error for a named field.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used after decoding, before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., currency code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
