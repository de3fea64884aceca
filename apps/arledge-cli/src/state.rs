//! # Application State
//!
//! Configuration plus a lazily opened `Database`.
//!
//! Commands that never touch the ledger (`schema`, `instructions`,
//! `--json-schema`) must not create a database file, so the pool is
//! opened on first use and then shared for the life of the process
//! (one CLI command, or a whole MCP session).

use arledge_db::Database;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};

#[derive(Debug)]
pub struct AppState {
    config: AppConfig,
    db: OnceCell<Database>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        AppState {
            config,
            db: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The database handle, connecting on first call.
    pub async fn db(&self) -> CliResult<&Database> {
        self.db
            .get_or_try_init(|| async {
                debug!(path = %self.config.db_path.display(), "Opening ledger database");
                let db_config = self.config.db_config()?;
                Ok::<_, CliError>(Database::new(db_config).await?)
            })
            .await
    }

    /// Closes the pool if it was ever opened.
    pub async fn close(&self) {
        if let Some(db) = self.db.get() {
            db.close().await;
        }
    }
}
