//! Command line definition.
//!
//! ```text
//! arledge [--db PATH] database initialize
//! arledge customer  create (--model JSON | --model-file PATH | --json-schema) | list
//! arledge creditor  create ... | list | view ID
//! arledge creditor  account create ... | account list [--creditor-id ID]
//! arledge invoice   create ... | list | view ID | export ID [--format json|text] [--path PATH]
//! arledge schema NAME
//! arledge instructions
//! arledge mcp start [--name NAME] [--json-response] [--dry-run]
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::ModelSource;
use crate::error::{CliError, CliResult};

/// Invoicing ledger: customers, creditors, payment accounts and invoices.
#[derive(Parser, Debug)]
#[command(name = "arledge", author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, value_name = "PATH", env = "ARLEDGE_DB_PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Database maintenance
    Database {
        #[command(subcommand)]
        command: DatabaseCommand,
    },

    /// Customer commands
    Customer {
        #[command(subcommand)]
        command: CustomerCommand,
    },

    /// Creditor commands
    Creditor {
        #[command(subcommand)]
        command: CreditorCommand,
    },

    /// Invoice commands
    Invoice {
        #[command(subcommand)]
        command: InvoiceCommand,
    },

    /// Print the JSON Schema of an input model
    Schema {
        /// customer, creditor, account, payment-account, invoice or invoice-line
        name: String,
    },

    /// Usage notes for agentic callers (printed on stderr)
    Instructions,

    /// Agent tool server
    Mcp {
        #[command(subcommand)]
        command: McpCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum DatabaseCommand {
    /// Create the ledger tables (drops them first in development mode)
    Initialize,
}

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// Create a customer from a JSON model
    Create(ModelArgs),
    /// List customers as JSON
    List,
}

#[derive(Subcommand, Debug)]
pub enum CreditorCommand {
    /// Create a creditor from a JSON model
    Create(ModelArgs),
    /// List creditors as JSON
    List,
    /// Show one creditor
    View {
        creditor_id: i64,
    },
    /// Payment accounts of creditors
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Create a payment account from a JSON model
    Create(ModelArgs),
    /// List payment accounts as JSON
    List {
        /// Only accounts of this creditor
        #[arg(long)]
        creditor_id: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum InvoiceCommand {
    /// Create an invoice (with lines) from a JSON model
    Create(ModelArgs),
    /// List invoices as JSON, newest first
    List,
    /// Show one invoice with lines and totals
    View {
        invoice_id: i64,
    },
    /// Write an invoice document to a file
    Export {
        invoice_id: i64,

        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Output file (default invoice-<id>.json)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum McpCommand {
    /// Serve the ledger tools over stdio (JSON-RPC, one message per line)
    Start(McpArgs),
}

#[derive(Args, Debug, Clone)]
pub struct McpArgs {
    /// Server name reported to clients
    #[arg(long)]
    pub name: Option<String>,

    /// Prefer JSON tool responses
    #[arg(long)]
    pub json_response: bool,

    /// Validate configuration, report and exit
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Text,
}

/// Where a create command takes its model from.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Model as inline JSON
    #[arg(long, conflicts_with = "model_file")]
    pub model: Option<String>,

    /// Path to a JSON file holding the model
    #[arg(long, value_name = "PATH")]
    pub model_file: Option<PathBuf>,

    /// Print the model's JSON Schema instead of creating anything
    #[arg(long)]
    pub json_schema: bool,
}

impl ModelArgs {
    pub fn source(&self) -> CliResult<ModelSource> {
        if self.json_schema {
            return Ok(ModelSource::Schema);
        }
        match (&self.model, &self.model_file) {
            (Some(json), _) => Ok(ModelSource::Inline(json.clone())),
            (None, Some(path)) => Ok(ModelSource::File(path.clone())),
            (None, None) => Err(CliError::usage("Provide --model or --model-file")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_db_flag_reads_environment() {
        let command = Cli::command();
        let db = command
            .get_arguments()
            .find(|arg| arg.get_id() == "db")
            .unwrap();
        assert_eq!(db.get_env().and_then(|v| v.to_str()), Some("ARLEDGE_DB_PATH"));
        assert!(db.is_global_set());
    }

    #[test]
    fn test_parse_invoice_export() {
        let cli = Cli::try_parse_from([
            "arledge", "--db", "books.db", "invoice", "export", "7", "--format", "text",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("books.db")));
        match cli.command {
            Command::Invoice {
                command: InvoiceCommand::Export { invoice_id, format, path },
            } => {
                assert_eq!(invoice_id, 7);
                assert_eq!(format, ExportFormat::Text);
                assert!(path.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_model_source() {
        let args = ModelArgs::default();
        assert_eq!(
            args.source().unwrap_err().message,
            "Provide --model or --model-file"
        );

        let args = ModelArgs {
            json_schema: true,
            ..ModelArgs::default()
        };
        assert!(matches!(args.source(), Ok(ModelSource::Schema)));
    }

    #[test]
    fn test_mcp_flags() {
        let cli = Cli::try_parse_from(["arledge", "mcp", "start", "--dry-run", "--name", "MyServer"])
            .unwrap();
        let Command::Mcp { command: McpCommand::Start(args) } = cli.command else {
            panic!("expected mcp start");
        };
        assert!(args.dry_run);
        assert!(!args.json_response);
        assert_eq!(args.name.as_deref(), Some("MyServer"));

        assert!(Cli::try_parse_from(["arledge", "mcp", "start", "--unknown-flag"]).is_err());
    }
}
