use crate::config::Config;
use crate::mcp::tool_result;
use crate::tools::{Dispatcher, PROTOCOL_VERSION};
use log::{debug, info, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

pub const SERVER_NAME: &str = "freelo-mcp";

// Minimal JSON-RPC 2.0 types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Str(String),
    Num(i64),
    Null,
}

#[derive(Debug, Deserialize)]
struct Request {
    #[allow(dead_code)]
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
    /// `None` only when the key is absent, which marks a notification.
    #[serde(default, deserialize_with = "present_id")]
    id: Option<Id>,
}

fn present_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Id>, D::Error> {
    Id::deserialize(d).map(Some)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Id,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn rpc_error(id: Id, code: i64, message: &str, data: Option<Value>) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.into(),
            data,
        }),
        id,
    }
}

fn rpc_ok(id: Id, result: Value) -> Response {
    Response {
        jsonrpc: "2.0".into(),
        result: Some(result),
        error: None,
        id,
    }
}

#[derive(Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Answers JSON-RPC requests for one MCP session.
pub struct Server {
    dispatcher: Dispatcher,
}

impl Server {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one line of input. Notifications and blank lines yield `None`.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        if line.trim().is_empty() {
            return None;
        }
        let raw: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("unparseable request: {}", e);
                return Some(rpc_error(Id::Null, -32700, &format!("Parse error: {}", e), None));
            }
        };
        let req: Request = match serde_json::from_value(raw) {
            Ok(r) => r,
            Err(e) => {
                return Some(rpc_error(
                    Id::Null,
                    -32600,
                    &format!("Invalid Request: {}", e),
                    None,
                ))
            }
        };
        let Some(id) = req.id else {
            debug!("notification {}", req.method);
            return None;
        };
        debug!("Received method={}", req.method);
        Some(self.dispatch(id, &req.method, req.params).await)
    }

    async fn dispatch(&self, id: Id, method: &str, params: Value) -> Response {
        match method {
            "initialize" => self.handle_initialize(id),
            "ping" => rpc_ok(id, json!({})),
            "tools/list" => rpc_ok(id, json!({ "tools": self.dispatcher.list_tools() })),
            "tools/call" => self.handle_tools_call(id, params).await,
            other => rpc_error(id, -32601, &format!("Method not found: {}", other), None),
        }
    }

    fn handle_initialize(&self, id: Id) -> Response {
        rpc_ok(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
    }

    async fn handle_tools_call(&self, id: Id, params: Value) -> Response {
        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return rpc_error(id, -32602, &format!("Invalid params: {}", e), None),
        };
        let outcome = self.dispatcher.call_tool(&call.name, call.arguments).await;
        match tool_result(outcome) {
            Ok(result) => rpc_ok(id, result),
            Err((code, message, data)) => rpc_error(id, code, &message, data),
        }
    }
}

/// Serve newline-delimited JSON-RPC on stdin/stdout until stdin closes.
pub async fn run_stdio_server() -> anyhow::Result<()> {
    info!("Starting {} stdio server; protocol={}", SERVER_NAME, PROTOCOL_VERSION);
    let server = Server::new(Dispatcher::from_config(Config::from_env()));
    if server.dispatcher().is_configured() {
        info!("Freelo client configured");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        let Some(resp) = server.handle_line(&line).await else {
            continue;
        };
        let mut payload = serde_json::to_vec(&resp)?;
        payload.push(b'\n');
        out.write_all(&payload).await?;
        out.flush().await?;
    }
    info!("stdin closed; shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> Server {
        Server::new(Dispatcher::new(Err(
            "FREELO_EMAIL and FREELO_API_KEY environment variables are required".into(),
        )))
    }

    async fn call(server: &Server, line: &str) -> Value {
        let resp = server.handle_line(line).await.expect("response");
        serde_json::to_value(resp).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_tools_capability() {
        let v = call(
            &unconfigured(),
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        )
        .await;
        assert_eq!(v["id"], 1);
        assert_eq!(v["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(v["result"]["serverInfo"]["name"], SERVER_NAME);
        assert!(v["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let s = unconfigured();
        assert!(s
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(s.handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn parse_and_method_errors() {
        let s = unconfigured();
        let v = call(&s, "{not json").await;
        assert_eq!(v["error"]["code"], -32700);
        assert!(v["id"].is_null());

        let v = call(&s, r#"{"jsonrpc":"2.0","id":"a","method":"resources/list"}"#).await;
        assert_eq!(v["error"]["code"], -32601);
        assert_eq!(v["id"], "a");
    }

    #[tokio::test]
    async fn tools_list_works_without_credentials() {
        let v = call(&unconfigured(), r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
        let tools = v["result"]["tools"].as_array().unwrap();
        assert!(tools.iter().any(|t| t["name"] == "freelo_list_projects"));
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn tool_call_error_mapping() {
        let s = unconfigured();
        let v = call(
            &s,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"freelo_nope","arguments":{}}}"#,
        )
        .await;
        assert_eq!(v["error"]["code"], -32601);

        let v = call(
            &s,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"freelo_list_users"}}"#,
        )
        .await;
        assert_eq!(v["error"]["code"], -32603);
        assert!(v["error"]["message"].as_str().unwrap().contains("FREELO_EMAIL"));

        let v = call(&s, r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{}}"#).await;
        assert_eq!(v["error"]["code"], -32602);
    }
}
