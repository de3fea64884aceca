//! # Commands
//!
//! The command layer shared by the CLI and the MCP tools.
//!
//! ## Output Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command(state, args) ──► Output { data, notices }                     │
//! │                                                                         │
//! │  data     JSON value built by serialize_deep                           │
//! │           CLI: pretty-printed on stdout    MCP: tool result text        │
//! │  notices  human text ("No invoices", "Exported to ...")                │
//! │           CLI: stderr                      MCP: text when no data       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod creditor;
pub mod customer;
pub mod database;
pub mod invoice;
pub mod schema;

use std::path::PathBuf;

use arledge_core::schema::{schema_for, SchemaName};
use arledge_core::validation::{parse_model, parse_model_value, Validate};
use arledge_core::{serialize_deep, ToDocument};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{CliError, CliResult};

// =============================================================================
// Output
// =============================================================================

/// Result of a successful command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Output {
    pub data: Option<Value>,
    pub notices: Vec<String>,
}

impl Output {
    pub fn json(data: Value) -> Self {
        Output {
            data: Some(data),
            notices: Vec::new(),
        }
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Output {
            data: None,
            notices: vec![message.into()],
        }
    }

    /// Serializes a domain value through its export document.
    pub fn document<T: ToDocument + ?Sized>(value: &T) -> Self {
        Output::json(serialize_deep(&value.to_document()))
    }

    /// A JSON list; an empty one also carries `empty_notice`.
    pub fn list<T: ToDocument>(items: &[T], empty_notice: &str) -> Self {
        let mut output = Output::document(items);
        if items.is_empty() {
            output.notices.push(empty_notice.to_string());
        }
        output
    }

    pub fn with_notice(mut self, message: impl Into<String>) -> Self {
        self.notices.push(message.into());
        self
    }

    /// Plain text form: a string payload as is, other JSON compact,
    /// notices when there is no payload.
    pub fn text(&self) -> String {
        match &self.data {
            Some(Value::String(text)) => text.clone(),
            Some(value) => value.to_string(),
            None => self.notices.join("\n"),
        }
    }
}

// =============================================================================
// Model Input
// =============================================================================

/// Where a create command takes its input model from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// JSON text (`--model`)
    Inline(String),
    /// Path to a JSON file (`--model-file`)
    File(PathBuf),
    /// Already decoded JSON (MCP `model` argument)
    Value(Value),
    /// Return the model's JSON Schema instead (`--json-schema`)
    Schema,
}

/// A decoded model, or the schema that was asked for instead.
#[derive(Debug)]
pub enum Loaded<T> {
    Model(T),
    Schema(Value),
}

/// Reads, decodes and validates an input model.
///
/// ## Errors
/// - `Failed to read model file: ...` when the file can't be read
/// - `Invalid <entity> JSON: ...` from the validation boundary
pub async fn load_model<T>(entity: &str, schema: SchemaName, source: ModelSource) -> CliResult<Loaded<T>>
where
    T: DeserializeOwned + Validate,
{
    let model = match source {
        ModelSource::Schema => return Ok(Loaded::Schema(schema_for(schema))),
        ModelSource::Inline(json) => parse_model(entity, &json)?,
        ModelSource::Value(value) => parse_model_value(entity, value)?,
        ModelSource::File(path) => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| CliError::io(format!("Failed to read model file: {e}")))?;
            parse_model(entity, &json)?
        }
    };
    Ok(Loaded::Model(model))
}
