use crate::error::ToolError;
use serde_json::{json, Value};

// Build an MCP result envelope for tools/call outputs.
// - content: a single text block so clients can render something.
// - structuredContent: the tool's JSON output as-is.
// - isError: included only when true.
pub fn mcp_wrap(structured: Value, text_opt: Option<String>, is_error: bool) -> Value {
    let text = match text_opt {
        Some(s) => s,
        None => serde_json::to_string_pretty(&structured).unwrap_or_else(|_| "{}".to_string()),
    };
    let mut obj = json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
    });
    if is_error {
        if let Some(map) = obj.as_object_mut() {
            map.insert("isError".to_string(), Value::Bool(true));
        }
    }
    obj
}

/// Envelope for a failed tool execution. The caller still gets a result, not
/// a protocol error, so the model can read the message.
pub fn error_result(message: &str, status_code: Option<u16>) -> Value {
    let mut error = json!({ "message": message });
    if let Some(code) = status_code {
        error["status_code"] = json!(code);
    }
    mcp_wrap(
        json!({ "error": error }),
        Some(format!("Error: {}", message)),
        true,
    )
}

/// Turn a dispatcher outcome into either a `tools/call` result or a JSON-RPC
/// error `(code, message, data)`.
pub fn tool_result(outcome: Result<Value, ToolError>) -> Result<Value, (i64, String, Option<Value>)> {
    match outcome {
        Ok(v) => Ok(mcp_wrap(v, None, false)),
        Err(ToolError::Execution {
            message,
            status_code,
        }) => Ok(error_result(&message, status_code)),
        Err(e) => {
            let data = match &e {
                ToolError::InvalidParams(errors) => Some(json!({ "errors": errors })),
                _ => None,
            };
            Err((e.rpc_code(), e.to_string(), data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_text_plus_structured() {
        let v = tool_result(Ok(json!({"count": 0}))).unwrap();
        assert_eq!(v["structuredContent"]["count"], 0);
        assert_eq!(v["content"][0]["type"], "text");
        assert!(v["content"][0]["text"].as_str().unwrap().contains("\"count\": 0"));
        assert!(v.get("isError").is_none());
    }

    #[test]
    fn execution_failure_is_flagged_result() {
        let v = tool_result(Err(ToolError::Execution {
            message: "Not Found: Task not found".into(),
            status_code: Some(404),
        }))
        .unwrap();
        assert_eq!(v["isError"], true);
        assert_eq!(v["structuredContent"]["error"]["status_code"], 404);
        assert_eq!(v["content"][0]["text"], "Error: Not Found: Task not found");
    }

    #[test]
    fn transport_failure_has_no_status() {
        let v = error_result("connection refused", None);
        assert!(v["structuredContent"]["error"].get("status_code").is_none());
    }

    #[test]
    fn protocol_errors_carry_codes() {
        let (code, msg, data) =
            tool_result(Err(ToolError::InvalidParams(vec!["task_id: Required".into()]))).unwrap_err();
        assert_eq!(code, -32602);
        assert!(msg.contains("task_id: Required"));
        assert_eq!(data.unwrap()["errors"][0], "task_id: Required");

        let (code, _, data) = tool_result(Err(ToolError::UnknownTool("x".into()))).unwrap_err();
        assert_eq!(code, -32601);
        assert!(data.is_none());
    }
}
