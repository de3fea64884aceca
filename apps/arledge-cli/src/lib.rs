//! # arledge-cli
//!
//! The `arledge` command line and its MCP stdio tool server.
//!
//! ## Module Organization
//! ```text
//! arledge_cli/
//! ├── lib.rs          ◄─── You are here (command routing)
//! ├── cli.rs          ◄─── clap definitions
//! ├── config.rs       ◄─── AppConfig from the environment
//! ├── state.rs        ◄─── AppState (config + lazily opened Database)
//! ├── error.rs        ◄─── CliError for exit codes and tool errors
//! ├── export.rs       ◄─── Invoice JSON files
//! ├── commands/       ◄─── Shared command layer (Output = JSON + notices)
//! └── mcp/            ◄─── JSON-RPC over stdio, tool catalogue
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod mcp;
pub mod state;

use cli::{AccountCommand, Command, CreditorCommand, CustomerCommand, DatabaseCommand, InvoiceCommand, McpCommand};
use commands::Output;
use error::CliResult;
use state::AppState;

/// Runs one parsed command.
///
/// `mcp start` serves until stdin closes and returns an empty output.
pub async fn run(state: &AppState, command: Command) -> CliResult<Output> {
    match command {
        Command::Database {
            command: DatabaseCommand::Initialize,
        } => commands::database::initialize(state).await,

        Command::Customer { command } => match command {
            CustomerCommand::Create(args) => commands::customer::create(state, args.source()?).await,
            CustomerCommand::List => commands::customer::list(state).await,
        },

        Command::Creditor { command } => match command {
            CreditorCommand::Create(args) => commands::creditor::create(state, args.source()?).await,
            CreditorCommand::List => commands::creditor::list(state).await,
            CreditorCommand::View { creditor_id } => commands::creditor::view(state, creditor_id).await,
            CreditorCommand::Account { command } => match command {
                AccountCommand::Create(args) => {
                    commands::creditor::account_create(state, args.source()?).await
                }
                AccountCommand::List { creditor_id } => {
                    commands::creditor::account_list(state, creditor_id).await
                }
            },
        },

        Command::Invoice { command } => match command {
            InvoiceCommand::Create(args) => commands::invoice::create(state, args.source()?).await,
            InvoiceCommand::List => commands::invoice::list(state).await,
            InvoiceCommand::View { invoice_id } => commands::invoice::view(state, invoice_id).await,
            InvoiceCommand::Export {
                invoice_id,
                format,
                path,
            } => commands::invoice::export(state, invoice_id, format, path).await,
        },

        Command::Schema { name } => commands::schema::schema(&name),

        Command::Instructions => Ok(commands::schema::instructions()),

        Command::Mcp {
            command: McpCommand::Start(args),
        } => {
            mcp::start(state, args).await?;
            Ok(Output::default())
        }
    }
}
