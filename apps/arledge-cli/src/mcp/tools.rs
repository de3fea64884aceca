//! # Ledger Tools
//!
//! The MCP tool catalogue and its dispatch onto the command layer.
//!
//! ## Tool Arguments
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  *_create            { model: {...} | model_file: "path",              │
//! │                        json_schema: true }                             │
//! │  creditor_view       { creditor_id: 1 }                                │
//! │  creditor_account_list { creditor_id?: 1 }                             │
//! │  invoice_view        { invoice_id: 7 }                                 │
//! │  invoice_export      { invoice_id: 7, format?: "json", path?: "..." }  │
//! │  schema              { name: "invoice" }                               │
//! │  ping, customer_list, creditor_list, invoice_list,                     │
//! │  database_initialize, instructions   {}                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cli::ExportFormat;
use crate::commands::{self, ModelSource, Output};
use crate::error::{CliError, CliResult};
use crate::state::AppState;

/// One entry of `tools/list`.
#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    kind: ArgsKind,
}

#[derive(Debug, Clone, Copy)]
enum ArgsKind {
    None,
    Model,
    CreditorId { required: bool },
    InvoiceId,
    Export,
    SchemaName,
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "ping",
        description: "Health-check tool; returns the string 'pong'.",
        kind: ArgsKind::None,
    },
    ToolSpec {
        name: "database_initialize",
        description: "Initialize the database (mirrors `arledge database initialize`).",
        kind: ArgsKind::None,
    },
    ToolSpec {
        name: "customer_create",
        description: "Create a customer from `model` or `model_file`; `json_schema` returns its schema.",
        kind: ArgsKind::Model,
    },
    ToolSpec {
        name: "customer_list",
        description: "Return all customers.",
        kind: ArgsKind::None,
    },
    ToolSpec {
        name: "creditor_create",
        description: "Create a creditor from `model` or `model_file`; `json_schema` returns its schema.",
        kind: ArgsKind::Model,
    },
    ToolSpec {
        name: "creditor_list",
        description: "Return all creditors.",
        kind: ArgsKind::None,
    },
    ToolSpec {
        name: "creditor_view",
        description: "Return a single creditor by id.",
        kind: ArgsKind::CreditorId { required: true },
    },
    ToolSpec {
        name: "creditor_account_create",
        description: "Create a payment account from `model` or `model_file`; `json_schema` returns its schema.",
        kind: ArgsKind::Model,
    },
    ToolSpec {
        name: "creditor_account_list",
        description: "List payment accounts; optionally filter by creditor_id.",
        kind: ArgsKind::CreditorId { required: false },
    },
    ToolSpec {
        name: "invoice_create",
        description: "Create an invoice with lines from `model` or `model_file`; `json_schema` returns its schema.",
        kind: ArgsKind::Model,
    },
    ToolSpec {
        name: "invoice_list",
        description: "Return all invoices, newest first, with lines and totals.",
        kind: ArgsKind::None,
    },
    ToolSpec {
        name: "invoice_view",
        description: "Return a single invoice by id.",
        kind: ArgsKind::InvoiceId,
    },
    ToolSpec {
        name: "invoice_export",
        description: "Export an invoice to a JSON file and return the file path.",
        kind: ArgsKind::Export,
    },
    ToolSpec {
        name: "schema",
        description: "Return the JSON Schema of customer, creditor, account, payment-account, invoice or invoice-line.",
        kind: ArgsKind::SchemaName,
    },
    ToolSpec {
        name: "instructions",
        description: "Return agent-facing usage notes.",
        kind: ArgsKind::None,
    },
];

impl ToolSpec {
    /// The `tools/list` entry, with a JSON Schema of the arguments.
    pub fn describe(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }

    fn input_schema(&self) -> Value {
        match self.kind {
            ArgsKind::None => json!({"type": "object", "properties": {}}),
            ArgsKind::Model => json!({
                "type": "object",
                "properties": {
                    "model": {"type": "object", "description": "Decoded input model"},
                    "model_file": {"type": "string", "description": "Path to a JSON model file"},
                    "json_schema": {"type": "boolean", "description": "Return the model's JSON Schema"}
                }
            }),
            ArgsKind::CreditorId { required } => {
                let mut schema = json!({
                    "type": "object",
                    "properties": {"creditor_id": {"type": "integer"}}
                });
                if required {
                    schema["required"] = json!(["creditor_id"]);
                }
                schema
            }
            ArgsKind::InvoiceId => json!({
                "type": "object",
                "properties": {"invoice_id": {"type": "integer"}},
                "required": ["invoice_id"]
            }),
            ArgsKind::Export => json!({
                "type": "object",
                "properties": {
                    "invoice_id": {"type": "integer"},
                    "format": {"type": "string", "enum": ["json", "text"]},
                    "path": {"type": "string"}
                },
                "required": ["invoice_id"]
            }),
            ArgsKind::SchemaName => json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"]
            }),
        }
    }
}

pub fn find(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelArgs {
    model: Option<Value>,
    model_file: Option<PathBuf>,
    json_schema: bool,
}

impl ModelArgs {
    fn source(self) -> CliResult<ModelSource> {
        if self.json_schema {
            return Ok(ModelSource::Schema);
        }
        match (self.model, self.model_file) {
            // A JSON-encoded string is accepted as well as an object.
            (Some(Value::String(json)), _) => Ok(ModelSource::Inline(json)),
            (Some(value), _) if !value.is_null() => Ok(ModelSource::Value(value)),
            (_, Some(path)) => Ok(ModelSource::File(path)),
            _ => Err(CliError::usage("Provide model or model_file")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreditorIdArgs {
    creditor_id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OptionalCreditorIdArgs {
    creditor_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct InvoiceIdArgs {
    invoice_id: i64,
}

#[derive(Debug, Deserialize)]
struct ExportArgs {
    invoice_id: i64,
    #[serde(default, alias = "fmt")]
    format: Option<String>,
    #[serde(default)]
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct SchemaArgs {
    name: String,
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> CliResult<T> {
    let args = if args.is_null() { json!({}) } else { args };
    serde_json::from_value(args)
        .map_err(|e| CliError::validation(format!("Invalid arguments for {tool}: {e}")))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs a tool against the shared state.
pub async fn call(state: &AppState, name: &str, args: Value) -> CliResult<Output> {
    match name {
        "ping" => Ok(Output::json(json!("pong"))),
        "database_initialize" => commands::database::initialize(state).await,
        "customer_create" => {
            let args: ModelArgs = parse_args(name, args)?;
            commands::customer::create(state, args.source()?).await
        }
        "customer_list" => commands::customer::list(state).await,
        "creditor_create" => {
            let args: ModelArgs = parse_args(name, args)?;
            commands::creditor::create(state, args.source()?).await
        }
        "creditor_list" => commands::creditor::list(state).await,
        "creditor_view" => {
            let args: CreditorIdArgs = parse_args(name, args)?;
            commands::creditor::view(state, args.creditor_id).await
        }
        "creditor_account_create" => {
            let args: ModelArgs = parse_args(name, args)?;
            commands::creditor::account_create(state, args.source()?).await
        }
        "creditor_account_list" => {
            let args: OptionalCreditorIdArgs = parse_args(name, args)?;
            commands::creditor::account_list(state, args.creditor_id).await
        }
        "invoice_create" => {
            let args: ModelArgs = parse_args(name, args)?;
            commands::invoice::create(state, args.source()?).await
        }
        "invoice_list" => commands::invoice::list(state).await,
        "invoice_view" => {
            let args: InvoiceIdArgs = parse_args(name, args)?;
            commands::invoice::view(state, args.invoice_id).await
        }
        "invoice_export" => {
            let args: ExportArgs = parse_args(name, args)?;
            let format = match args.format.as_deref() {
                None | Some("json") => ExportFormat::Json,
                Some("text") => ExportFormat::Text,
                Some(other) => {
                    return Err(CliError::validation(format!("Unknown export format: {other}")))
                }
            };
            commands::invoice::export(state, args.invoice_id, format, args.path).await
        }
        "schema" => {
            let args: SchemaArgs = parse_args(name, args)?;
            commands::schema::schema(&args.name)
        }
        "instructions" => Ok(commands::schema::instructions()),
        other => Err(CliError::validation(format!("Unknown tool: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue() {
        assert_eq!(TOOLS.len(), 15);
        assert!(find("invoice_export").is_some());
        assert!(find("invoice_delete").is_none());

        let view = find("invoice_view").unwrap().describe();
        assert_eq!(view["inputSchema"]["required"], json!(["invoice_id"]));

        let list = find("creditor_account_list").unwrap().describe();
        assert!(list["inputSchema"].get("required").is_none());
    }

    #[test]
    fn test_model_args() {
        let args: ModelArgs = parse_args("x", json!({"model": {"name": "A"}})).unwrap();
        assert!(matches!(args.source(), Ok(ModelSource::Value(_))));

        let args: ModelArgs = parse_args("x", json!({"model": "{\"name\": \"A\"}"})).unwrap();
        assert!(matches!(args.source(), Ok(ModelSource::Inline(_))));

        let args: ModelArgs = parse_args("x", Value::Null).unwrap();
        assert_eq!(args.source().unwrap_err().message, "Provide model or model_file");
    }
}
