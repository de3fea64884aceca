//! Agent tool server: the ledger commands as MCP tools over stdio.

pub mod protocol;
pub mod server;
pub mod tools;

use tokio::io::{stdin, stdout, BufReader};

pub use server::{McpServer, DEFAULT_SERVER_NAME};

use crate::cli::McpArgs;
use crate::error::{CliError, CliResult};
use crate::state::AppState;

/// `mcp start`: serves stdin/stdout until the client closes the stream.
///
/// `--dry-run` only reports the resolved settings on stderr.
pub async fn start(state: &AppState, args: McpArgs) -> CliResult<()> {
    let server = McpServer::new(state, args.name, args.json_response);

    if args.dry_run {
        eprintln!(
            "MCP dry-run: name={}, json_response={}",
            server.name(),
            args.json_response
        );
        return Ok(());
    }

    eprintln!(
        "Starting MCP stdio server: name={}, json_response={}",
        server.name(),
        args.json_response
    );
    server
        .serve(BufReader::new(stdin()), stdout())
        .await
        .map_err(|e| CliError::io(format!("MCP transport failed: {e}")))
}
