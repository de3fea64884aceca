use std::path::PathBuf;

use arledge_cli::cli::{Cli, ExportFormat};
use arledge_cli::commands::{self, ModelSource};
use arledge_cli::config::AppConfig;
use arledge_cli::error::ErrorCode;
use arledge_cli::state::AppState;
use clap::Parser;
use serde_json::{json, Value};
use tempfile::TempDir;

fn state_in(dir: &TempDir) -> AppState {
    AppState::new(AppConfig {
        db_path: dir.path().join("ledger.db"),
        ..AppConfig::default()
    })
}

fn inline(value: Value) -> ModelSource {
    ModelSource::Inline(value.to_string())
}

#[tokio::test]
async fn empty_lists_print_array_and_notice() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);

    let cases = [
        (commands::customer::list(&state).await.unwrap(), "No customers"),
        (commands::creditor::list(&state).await.unwrap(), "No creditors"),
        (
            commands::creditor::account_list(&state, None).await.unwrap(),
            "No payment accounts",
        ),
        (commands::invoice::list(&state).await.unwrap(), "No invoices"),
    ];

    for (output, notice) in cases {
        assert_eq!(output.data, Some(json!([])));
        assert_eq!(output.notices, vec![notice.to_string()]);
    }
}

#[tokio::test]
async fn initialize_reports_path() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);

    let output = commands::database::initialize(&state).await.unwrap();
    assert_eq!(
        output.notices,
        vec![format!("Initialized database at {}", dir.path().join("ledger.db").display())]
    );
    assert!(dir.path().join("ledger.db").exists());
}

#[tokio::test]
async fn schema_requests_do_not_create_a_database() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);

    let output = commands::invoice::create(&state, ModelSource::Schema).await.unwrap();
    assert!(output.data.unwrap()["properties"].get("lines").is_some());
    assert!(!dir.path().join("ledger.db").exists());
}

#[tokio::test]
async fn invoice_flow_create_view_export() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);

    let customer = commands::customer::create(&state, inline(json!({"name": "ACME AB"})))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(customer["id"], 1);

    let created = commands::invoice::create(
        &state,
        inline(json!({
            "customer_id": 1,
            "created_at": "2020-01-01T00:00:00",
            "lines": [{"description": "Consulting", "quantity": 2, "unit_price": "10.00", "vat_rate": 25}]
        })),
    )
    .await
    .unwrap()
    .data
    .unwrap();

    assert_eq!(created["invoice_number"], "INV-0001");
    assert_eq!(created["created_at"], "2020-01-01T00:00:00Z");
    assert_eq!(created["status"], "draft");
    assert_eq!(created["lines"][0]["net"], "20.00");
    assert_eq!(created["lines"][0]["vat"], "5.00");
    assert_eq!(created["subtotal"], "20.00");
    assert_eq!(created["total_vat"], "5.00");
    assert_eq!(created["total"], "25.00");

    let viewed = commands::invoice::view(&state, 1).await.unwrap().data.unwrap();
    assert_eq!(viewed, created);

    let path = dir.path().join("exported.json");
    let output = commands::invoice::export(&state, 1, ExportFormat::Json, Some(path.clone()))
        .await
        .unwrap();
    assert_eq!(output.data.unwrap()["path"], path.display().to_string());
    assert!(output.notices[0].starts_with("Exported to "));

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, created);
}

#[tokio::test]
async fn error_messages() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);

    let err = commands::invoice::view(&state, 99).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Invoice not found");

    let err = commands::creditor::view(&state, 3).await.unwrap_err();
    assert_eq!(err.message, "Creditor not found");

    let err = commands::customer::create(&state, ModelSource::Inline("{not json".into()))
        .await
        .unwrap_err();
    assert!(err.message.starts_with("Invalid customer JSON"), "{}", err.message);

    let err = commands::customer::create(
        &state,
        ModelSource::File(PathBuf::from(dir.path().join("missing.json"))),
    )
    .await
    .unwrap_err();
    assert!(err.message.starts_with("Failed to read model file:"));

    let err = commands::invoice::export(&state, 1, ExportFormat::Text, None)
        .await
        .unwrap_err();
    assert_eq!(err.message, "Text export not implemented yet");

    let err = commands::invoice::create(
        &state,
        inline(json!({"customer_id": 1, "lines": [{"description": "x", "unit_price": true}]})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn model_file_and_default_account() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);

    let creditor_file = dir.path().join("creditor.json");
    std::fs::write(&creditor_file, r#"{"name": "Me Consulting", "default_currency": "eur"}"#).unwrap();
    let creditor = commands::creditor::create(&state, ModelSource::File(creditor_file))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(creditor["default_currency"], "EUR");

    for kind in ["bankgiro", "iban"] {
        commands::creditor::account_create(
            &state,
            inline(json!({"creditor_id": 1, "type": kind, "is_default": true})),
        )
        .await
        .unwrap();
    }

    let accounts = commands::creditor::account_list(&state, Some(1))
        .await
        .unwrap()
        .data
        .unwrap();
    let defaults: Vec<&str> = accounts
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["is_default"] == true)
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(defaults, vec!["iban"]);
}

#[test]
fn missing_model_is_a_usage_error() {
    let cli = Cli::try_parse_from(["arledge", "customer", "create"]).unwrap();
    let arledge_cli::cli::Command::Customer {
        command: arledge_cli::cli::CustomerCommand::Create(args),
    } = cli.command
    else {
        panic!("expected customer create");
    };
    let err = args.source().unwrap_err();
    assert_eq!(err.message, "Provide --model or --model-file");
    assert_eq!(err.code, ErrorCode::Usage);
}

#[tokio::test]
async fn instructions_and_schema() {
    let output = arledge_cli::run(
        &AppState::new(AppConfig::default()),
        Cli::try_parse_from(["arledge", "instructions"]).unwrap().command,
    )
    .await
    .unwrap();
    assert!(output.data.is_none());
    assert!(output.notices[0].contains("Instructions for agentic systems"));

    let err = arledge_cli::run(
        &AppState::new(AppConfig::default()),
        Cli::try_parse_from(["arledge", "schema", "widget"]).unwrap().command,
    )
    .await
    .unwrap_err();
    assert_eq!(err.message, "Unknown schema name");
}
