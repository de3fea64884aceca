//! # Invoice Commands
//!
//! ```text
//! invoice create ──► NewInvoice ──► InvoiceRepository::create ──► Invoice
//!                                                                  │
//!         view / list / export ◄── serialize_deep(to_document) ◄──┘
//!         (invoice_number, lines, subtotal, total_vat, total as "0.00")
//! ```

use std::path::PathBuf;

use arledge_core::schema::SchemaName;
use arledge_core::validation::NewInvoice;
use serde_json::json;

use super::{load_model, Loaded, ModelSource, Output};
use crate::cli::ExportFormat;
use crate::error::{CliError, CliResult};
use crate::export::{default_export_path, write_json};
use crate::state::AppState;

pub async fn create(state: &AppState, source: ModelSource) -> CliResult<Output> {
    let model: NewInvoice = match load_model("invoice", SchemaName::Invoice, source).await? {
        Loaded::Model(model) => model,
        Loaded::Schema(schema) => return Ok(Output::json(schema)),
    };

    let invoice = state.db().await?.invoices().create(&model).await?;
    Ok(Output::document(&invoice))
}

pub async fn list(state: &AppState) -> CliResult<Output> {
    let invoices = state.db().await?.invoices().list().await?;
    Ok(Output::list(&invoices, "No invoices"))
}

pub async fn view(state: &AppState, invoice_id: i64) -> CliResult<Output> {
    let invoice = state.db().await?.invoices().get(invoice_id).await?;
    Ok(Output::document(&invoice))
}

/// Writes the invoice document to `path` (default `invoice-<id>.json`).
///
/// The data is `{"path": ...}` so callers can pick the file up.
pub async fn export(
    state: &AppState,
    invoice_id: i64,
    format: ExportFormat,
    path: Option<PathBuf>,
) -> CliResult<Output> {
    if format == ExportFormat::Text {
        return Err(CliError::unsupported("Text export not implemented yet"));
    }

    let invoice = state.db().await?.invoices().get(invoice_id).await?;
    let document = Output::document(&invoice).data.unwrap_or_default();

    let path = path.unwrap_or_else(|| default_export_path(invoice_id));
    write_json(&path, &document).await?;

    let shown = path.display().to_string();
    Ok(Output::json(json!({ "path": shown })).with_notice(format!("Exported to {shown}")))
}
