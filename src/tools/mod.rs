mod comments;
mod files;
mod people;
mod projects;
mod tasklists;
mod tasks;
mod timetracking;

use crate::config::Config;
use crate::error::{HandlerError, ToolError};
use crate::http::FreeloClient;
use crate::schema::ObjectSchema;
use futures::future::BoxFuture;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

pub use timetracking::summarize_reports;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub type HandlerResult = Result<Value, HandlerError>;

/// Async tool body: validated input plus the shared client.
pub type Handler = for<'a> fn(Value, &'a FreeloClient) -> BoxFuture<'a, HandlerResult>;

pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: ObjectSchema,
    pub handler: Handler,
}

impl ToolDefinition {
    pub fn new(
        name: &'static str,
        description: &'static str,
        schema: ObjectSchema,
        handler: Handler,
    ) -> Self {
        Self {
            name,
            description,
            schema,
            handler,
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.schema.to_json_schema(),
        }
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Every tool the server exposes, in `tools/list` order.
pub fn registry() -> Vec<ToolDefinition> {
    let mut tools = Vec::new();
    tools.extend(projects::tools());
    tools.extend(tasks::tools());
    tools.extend(tasklists::tools());
    tools.extend(comments::tools());
    tools.extend(timetracking::tools());
    tools.extend(people::tools());
    tools.extend(files::tools());
    tools
}

pub(crate) fn parse<T: DeserializeOwned>(input: Value) -> Result<T, HandlerError> {
    Ok(serde_json::from_value(input)?)
}

pub(crate) fn done(message: String) -> Value {
    json!({ "success": true, "message": message })
}

pub(crate) const NOT_CONFIRMED: &str = "Deletion not confirmed. Set confirm to true to delete.";

pub(crate) fn not_confirmed() -> Value {
    json!({ "success": false, "error": NOT_CONFIRMED })
}

/// Looks up, validates and runs tools against one configured client.
pub struct Dispatcher {
    tools: Vec<ToolDefinition>,
    client: Result<FreeloClient, String>,
}

impl Dispatcher {
    pub fn new(client: Result<FreeloClient, String>) -> Self {
        Self {
            tools: registry(),
            client,
        }
    }

    /// Build the client from a loaded configuration. Configuration and client
    /// errors are kept and reported on each tool call.
    pub fn from_config<E: std::fmt::Display>(cfg: Result<Config, E>) -> Self {
        let client = match cfg {
            Ok(cfg) => FreeloClient::new(&cfg).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = &client {
            warn!("Freelo client not configured: {}", e);
        }
        Self::new(client)
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_ok()
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(ToolDefinition::descriptor).collect()
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let call_id = Uuid::new_v4();
        let Some(tool) = self.tool(name) else {
            warn!("[{}] unknown tool {}", call_id, name);
            return Err(ToolError::UnknownTool(name.to_string()));
        };
        let client = match &self.client {
            Ok(c) => c,
            Err(e) => {
                warn!("[{}] {} called without configuration: {}", call_id, name, e);
                return Err(ToolError::ClientNotConfigured(e.clone()));
            }
        };

        let input = tool.schema.validate(&arguments).map_err(|errors| {
            debug!("[{}] {} rejected input: {:?}", call_id, name, errors);
            ToolError::InvalidParams(errors)
        })?;

        info!("[{}] tool {}", call_id, name);
        debug!("[{}] validated input: {}", call_id, input);
        match (tool.handler)(input, client).await {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!("[{}] tool {} failed: {}", call_id, name, e);
                Err(ToolError::execution(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique_and_prefixed() {
        let tools = registry();
        let names: HashSet<_> = tools.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), tools.len());
        assert!(tools.iter().all(|t| t.name.starts_with("freelo_")));
    }

    #[test]
    fn descriptors_are_object_schemas() {
        for d in registry().iter().map(ToolDefinition::descriptor) {
            assert_eq!(d.input_schema["type"], "object", "{}", d.name);
            assert!(!d.description.is_empty(), "{}", d.name);
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_before_configuration() {
        let d = Dispatcher::new(Err("missing".into()));
        let err = d.call_tool("freelo_nope", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(ref n) if n == "freelo_nope"));
    }

    #[tokio::test]
    async fn unconfigured_client_skips_validation() {
        let d = Dispatcher::new(Err("FREELO_EMAIL and FREELO_API_KEY environment variables are required".into()));
        // arguments are invalid, yet the configuration error wins
        let err = d
            .call_tool("freelo_get_task", json!({"task_id": "x"}))
            .await
            .unwrap_err();
        match err {
            ToolError::ClientNotConfigured(msg) => assert!(msg.contains("FREELO_EMAIL")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
