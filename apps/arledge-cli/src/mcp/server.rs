//! # MCP Stdio Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  stdin  ──line──► parse ──► dispatch(method) ──► Response ──line──► stdout│
//! │                                                                         │
//! │  initialize                 server info + tools capability             │
//! │  notifications/initialized  no response                               │
//! │  ping                       {}                                         │
//! │  tools/list                 TOOLS                                      │
//! │  tools/call                 content: [{type: text}], isError           │
//! │  anything else              -32601 Method not found                    │
//! │  unreadable JSON            -32700 Parse error                         │
//! │                                                                         │
//! │  Logs go to stderr; stdout carries protocol messages only.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::protocol::{
    Request, Response, INVALID_PARAMS, INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};
use super::tools::{self, TOOLS};
use crate::commands::Output;
use crate::error::CliResult;
use crate::state::AppState;

pub const DEFAULT_SERVER_NAME: &str = "Arledge MCP";

pub struct McpServer<'a> {
    state: &'a AppState,
    name: String,
    json_response: bool,
}

impl<'a> McpServer<'a> {
    pub fn new(state: &'a AppState, name: Option<String>, json_response: bool) -> Self {
        McpServer {
            state,
            name: name.unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            json_response,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Serves until the reader is exhausted.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(name = %self.name, json_response = self.json_response, "MCP server started");

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(reply) = self.handle_line(&line).await {
                writer.write_all(reply.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("MCP input closed, shutting down");
        Ok(())
    }

    /// One line in, at most one line out.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let response = match serde_json::from_str::<Value>(line) {
            Err(e) => {
                warn!(error = %e, "Unreadable JSON-RPC message");
                Some(Response::error(Value::Null, PARSE_ERROR, "Parse error"))
            }
            Ok(value) => {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                match serde_json::from_value::<Request>(value) {
                    Ok(request) => self.handle(request).await,
                    Err(e) => Some(Response::error(
                        id,
                        INVALID_REQUEST,
                        format!("Invalid request: {e}"),
                    )),
                }
            }
        }?;

        // Response holds only strings and JSON values.
        serde_json::to_string(&response).ok()
    }

    /// Dispatches a request. Notifications get no response.
    pub async fn handle(&self, request: Request) -> Option<Response> {
        debug!(method = %request.method, "MCP request");

        if request.is_notification() {
            return None;
        }

        let id = request.id.clone().unwrap_or(Value::Null);
        if request.jsonrpc.as_deref().is_some_and(|v| v != JSONRPC_VERSION) {
            return Some(Response::error(id, INVALID_REQUEST, "Unsupported jsonrpc version"));
        }

        let response = match request.method.as_str() {
            "initialize" => Response::success(id, self.initialize_result(request.params.as_ref())),
            "ping" => Response::success(id, json!({})),
            "tools/list" => Response::success(id, self.tools_list()),
            "tools/call" => match self.tools_call(request.params).await {
                Ok(result) => Response::success(id, result),
                Err((code, message)) => Response::error(id, code, message),
            },
            other => Response::error(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
        };
        Some(response)
    }

    fn initialize_result(&self, params: Option<&Value>) -> Value {
        // Echo the client's revision when it sent one.
        let version = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or(PROTOCOL_VERSION);

        json!({
            "protocolVersion": version,
            "capabilities": {"tools": {"listChanged": false}},
            "serverInfo": {"name": self.name, "version": env!("CARGO_PKG_VERSION")},
            "instructions": crate::commands::schema::INSTRUCTIONS,
        })
    }

    fn tools_list(&self) -> Value {
        let tools: Vec<Value> = TOOLS.iter().map(|tool| tool.describe()).collect();
        json!({ "tools": tools })
    }

    async fn tools_call(&self, params: Option<Value>) -> Result<Value, (i64, String)> {
        let params = params.unwrap_or(Value::Null);
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or((INVALID_PARAMS, "tools/call requires a tool name".to_string()))?;
        if tools::find(name).is_none() {
            return Err((INVALID_PARAMS, format!("Unknown tool: {name}")));
        }
        let args = params.get("arguments").cloned().unwrap_or(Value::Null);

        let result = tools::call(self.state, name, args).await;
        Ok(self.tool_result(name, result))
    }

    fn tool_result(&self, name: &str, result: CliResult<Output>) -> Value {
        match result {
            Ok(output) => {
                let mut value = json!({
                    "content": [{"type": "text", "text": output.text()}],
                    "isError": false,
                });
                if self.json_response {
                    if let Some(data) = output.data {
                        value["structuredContent"] = match data {
                            Value::Object(_) => data,
                            other => json!({ "result": other }),
                        };
                    }
                }
                value
            }
            Err(err) => {
                debug!(tool = name, error = %err, "Tool failed");
                json!({
                    "content": [{"type": "text", "text": err.message}],
                    "isError": true,
                })
            }
        }
    }
}
