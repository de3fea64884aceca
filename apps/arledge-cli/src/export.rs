//! Invoice export files.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// `invoice-<id>.json` in the working directory.
pub fn default_export_path(invoice_id: i64) -> PathBuf {
    PathBuf::from(format!("invoice-{invoice_id}.json"))
}

/// Writes a document as pretty-printed JSON.
pub async fn write_json(path: &Path, document: &Value) -> CliResult<()> {
    let mut text = serde_json::to_string_pretty(document)
        .map_err(|e| CliError::new(crate::error::ErrorCode::Internal, e.to_string()))?;
    text.push('\n');

    tokio::fs::write(path, text)
        .await
        .map_err(|e| CliError::io(format!("Failed to write {}: {e}", path.display())))?;

    debug!(path = %path.display(), "Export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_default_path() {
        assert_eq!(default_export_path(7), PathBuf::from("invoice-7.json"));
    }

    #[tokio::test]
    async fn test_write_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &json!({"total": "25.00"})).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"total\": \"25.00\""));

        let missing = dir.path().join("no/such/dir/out.json");
        assert!(write_json(&missing, &json!({})).await.is_err());
    }
}
