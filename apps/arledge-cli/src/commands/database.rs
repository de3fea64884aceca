//! `database initialize`

use tracing::info;

use super::Output;
use crate::error::CliResult;
use crate::state::AppState;

/// Creates the ledger tables; in development mode they are dropped first.
pub async fn initialize(state: &AppState) -> CliResult<Output> {
    let db = state.db().await?;
    db.initialize().await?;

    let path = state.config().db_path.display().to_string();
    info!(%path, development = db.is_development(), "Database initialized");
    Ok(Output::notice(format!("Initialized database at {path}")))
}
