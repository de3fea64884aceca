//! # arledge
//!
//! ## Startup Sequence
//! 1. Parse the command line (clap exits with usage on bad flags)
//! 2. Initialize tracing on stderr (`RUST_LOG`, default `warn,arledge=info,sqlx=warn`)
//! 3. Load configuration from the environment, apply `--db`
//! 4. Run the command: JSON on stdout, notices on stderr
//! 5. Close the pool and exit non-zero on error

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use arledge_cli::cli::Cli;
use arledge_cli::commands::Output;
use arledge_cli::config::AppConfig;
use arledge_cli::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,arledge=info,sqlx=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config.with_db_path(cli.db),
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::from(1));
        }
    };

    let state = AppState::new(config);
    let result = arledge_cli::run(&state, cli.command).await;
    state.close().await;

    match result {
        Ok(output) => {
            print_output(&output).context("Failed to write output")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{err}");
            Ok(ExitCode::from(err.exit_code() as u8))
        }
    }
}

fn print_output(output: &Output) -> anyhow::Result<()> {
    if let Some(data) = &output.data {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, data)?;
        writeln!(stdout)?;
    }
    for notice in &output.notices {
        eprintln!("{notice}");
    }
    Ok(())
}
