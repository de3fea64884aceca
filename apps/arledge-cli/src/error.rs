//! # CLI Error Type
//!
//! Unified error type for commands, shared by the CLI and the MCP tools.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Command Function  → Result<Value, CliError>                           │
//! │         │                                                               │
//! │         ├── DbError::NotFound ─────────► NOT_FOUND  "Invoice not found" │
//! │         ├── CoreError::InvalidModel ───► VALIDATION "Invalid ... JSON"  │
//! │         ├── file read failure ─────────► IO         "Failed to read..." │
//! │         └── anything else ─────────────► DATABASE / INTERNAL            │
//! │                                                                         │
//! │  CLI:  message on stderr, non-zero exit status                         │
//! │  MCP:  tool result with isError = true and the message as text         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use arledge_core::CoreError;
use arledge_db::DbError;
use serde::Serialize;

use crate::config::ConfigError;

/// Error returned from a command.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message, printed as is
    pub message: String,
}

/// Error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown id
    NotFound,

    /// Bad input model or argument
    ValidationError,

    /// Wrong combination of flags
    Usage,

    /// Reading a model file or writing an export failed
    Io,

    /// Database operation failed
    DatabaseError,

    /// Configuration rejected
    Config,

    /// Feature not available
    Unsupported,

    Internal,
}

impl ErrorCode {
    /// Process exit status for this category.
    pub const fn exit_code(self) -> i32 {
        match self {
            ErrorCode::Usage => 2,
            _ => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Usage, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Io, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Unsupported, message)
    }

    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }
}

/// Converts database errors to CLI errors.
impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => CliError::new(ErrorCode::NotFound, err.to_string()),
            DbError::Core(core) => core.into(),
            DbError::ForeignKeyViolation { .. } => CliError::validation(err.to_string()),
            DbError::InvalidConfig(_) => CliError::new(ErrorCode::Config, err.to_string()),
            DbError::Internal(ref e) => {
                tracing::error!("Internal database error: {}", e);
                CliError::new(ErrorCode::Internal, err.to_string())
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                CliError::new(ErrorCode::DatabaseError, other.to_string())
            }
        }
    }
}

/// Converts core errors to CLI errors.
impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidModel { .. }
            | CoreError::Validation(_)
            | CoreError::InvalidArgument { .. }
            | CoreError::Parse(_) => CliError::validation(err.to_string()),
            CoreError::Overflow { .. } => CliError::new(ErrorCode::Internal, err.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::new(ErrorCode::Config, err.to_string())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_message() {
        let err: CliError = DbError::not_found("Invoice", 7).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.to_string(), "Invoice not found");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_core_errors_are_validation() {
        let err: CliError = CoreError::InvalidModel {
            entity: "customer".into(),
            reason: "EOF while parsing".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.starts_with("Invalid customer JSON"));

        let wrapped: CliError = DbError::Core(CoreError::invalid_argument("quantity", "bad")).into();
        assert_eq!(wrapped.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_usage_exit_code() {
        assert_eq!(CliError::usage("Provide --model or --model-file").exit_code(), 2);
    }
}
