use arledge_cli::config::AppConfig;
use arledge_cli::mcp::McpServer;
use arledge_cli::state::AppState;
use serde_json::{json, Value};
use tempfile::TempDir;

fn state_in(dir: &TempDir) -> AppState {
    AppState::new(AppConfig {
        db_path: dir.path().join("ledger.db"),
        ..AppConfig::default()
    })
}

async fn call(server: &McpServer<'_>, request: Value) -> Value {
    let reply = server
        .handle_line(&request.to_string())
        .await
        .expect("request should be answered");
    serde_json::from_str(&reply).unwrap()
}

async fn call_tool(server: &McpServer<'_>, name: &str, arguments: Value) -> Value {
    let reply = call(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await;
    reply["result"].clone()
}

fn text(result: &Value) -> &str {
    result["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn handshake_and_listing() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);
    let server = McpServer::new(&state, None, false);

    let init = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 0, "method": "initialize", "params": {"protocolVersion": "2024-11-05"}}),
    )
    .await;
    assert_eq!(init["result"]["serverInfo"]["name"], "Arledge MCP");
    assert!(init["result"]["capabilities"]["tools"].is_object());

    let initialized = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    assert!(server.handle_line(&initialized.to_string()).await.is_none());

    let tools = call(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
    let names: Vec<&str> = tools["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 15);
    assert!(names.contains(&"creditor_account_create"));
    assert!(names.contains(&"invoice_export"));
}

#[tokio::test]
async fn protocol_errors() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);
    let server = McpServer::new(&state, None, false);

    let reply: Value = serde_json::from_str(&server.handle_line("{oops").await.unwrap()).unwrap();
    assert_eq!(reply["error"]["code"], -32700);
    assert_eq!(reply["id"], Value::Null);

    let reply = call(&server, json!({"jsonrpc": "2.0", "id": 9, "method": "resources/list"})).await;
    assert_eq!(reply["error"]["code"], -32601);
    assert_eq!(reply["id"], 9);
}

#[tokio::test]
async fn null_id_still_gets_a_reply() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);
    let server = McpServer::new(&state, None, false);

    let reply = call(&server, json!({"jsonrpc": "2.0", "id": null, "method": "ping"})).await;
    assert_eq!(reply, json!({"jsonrpc": "2.0", "id": null, "result": {}}));
}

#[tokio::test]
async fn tools_share_the_command_layer() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);
    let server = McpServer::new(&state, Some("Books".into()), true);

    assert_eq!(text(&call_tool(&server, "ping", json!({})).await), "pong");

    let empty = call_tool(&server, "invoice_list", json!({})).await;
    assert_eq!(text(&empty), "[]");
    assert_eq!(empty["structuredContent"], json!({"result": []}));

    let created = call_tool(
        &server,
        "invoice_create",
        json!({"model": {
            "customer_id": 4,
            "lines": [{"description": "Work", "quantity": "1.5", "unit_price": "100", "vat_rate": "25"}]
        }}),
    )
    .await;
    assert_eq!(created["isError"], false);
    let invoice: Value = serde_json::from_str(text(&created)).unwrap();
    assert_eq!(invoice["invoice_number"], "INV-0001");
    assert_eq!(invoice["total"], "187.50");
    assert_eq!(created["structuredContent"]["total_vat"], "37.50");

    let path = dir.path().join("inv.json");
    let exported = call_tool(
        &server,
        "invoice_export",
        json!({"invoice_id": 1, "path": path.display().to_string()}),
    )
    .await;
    assert_eq!(exported["isError"], false);
    assert!(path.exists());

    let schema = call_tool(&server, "schema", json!({"name": "account"})).await;
    let schema: Value = serde_json::from_str(text(&schema)).unwrap();
    assert!(schema["properties"].get("type").is_some());
}

#[tokio::test]
async fn tool_failures_are_results() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);
    let server = McpServer::new(&state, None, false);

    let missing = call_tool(&server, "invoice_view", json!({"invoice_id": 5})).await;
    assert_eq!(missing["isError"], true);
    assert_eq!(text(&missing), "Invoice not found");

    let no_model = call_tool(&server, "customer_create", json!({})).await;
    assert_eq!(no_model["isError"], true);
    assert_eq!(text(&no_model), "Provide model or model_file");

    let unknown = call_tool(&server, "schema", json!({"name": "widget"})).await;
    assert_eq!(text(&unknown), "Unknown schema name");

    let reply = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "drop_everything"}}),
    )
    .await;
    assert_eq!(reply["error"]["code"], -32602);
}

#[tokio::test]
async fn serve_over_byte_streams() {
    let dir = TempDir::new().unwrap();
    let state = state_in(&dir);
    let server = McpServer::new(&state, None, false);

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string(),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        String::new(),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {"name": "customer_list"}})
            .to_string(),
    ]
    .join("\n");

    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
    assert_eq!(lines[1]["result"]["content"][0]["text"], "[]");
}
