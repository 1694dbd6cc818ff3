//! Tool invocation adapter.
//!
//! When an agent's decision names a tool, the registry looks it up (exact
//! match first, then case-insensitive), invokes it, and captures the outcome
//! as a `ToolCallRecord` attached to the agent's outgoing response. Both
//! success and failure are represented as data; an invocation never throws
//! outward.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Audit record of one tool invocation. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallRecord {
    pub tool: String,
    pub input: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// A side-effect capability agents can request by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, CoreError>;
}

/// Adapter wrapping a plain closure as a `Tool`. Handy for tests and for
/// callers whose tools have no async work of their own.
pub struct FnTool {
    name: String,
    f: Box<dyn Fn(serde_json::Value) -> Result<serde_json::Value, CoreError> + Send + Sync>,
}

impl FnTool {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(serde_json::Value) -> Result<serde_json::Value, CoreError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<serde_json::Value, CoreError> {
        (self.f)(input)
    }
}

/// Registry of the tools available to a run.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        if self.lookup(tool.name()).is_some() {
            tracing::warn!("[ToolRegistry] Replacing tool: {}", tool.name());
            self.tools.retain(|t| t.name() != tool.name());
        }
        self.tools.push(tool);
    }

    /// Find a tool by exact name, falling back to a case-insensitive match.
    pub fn lookup(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .or_else(|| self.tools.iter().find(|t| t.name().eq_ignore_ascii_case(name)))
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Invoke a named tool and capture the outcome. Unknown tools and tool
    /// failures both come back as error records, never as an `Err`.
    pub async fn invoke(&self, name: &str, input: serde_json::Value) -> ToolCallRecord {
        let Some(tool) = self.lookup(name) else {
            tracing::warn!("[ToolRegistry] Unknown tool requested: {}", name);
            return ToolCallRecord {
                tool: name.to_string(),
                input,
                output: None,
                error: Some(format!("Unknown tool: {}", name)),
            };
        };

        match tool.invoke(input.clone()).await {
            Ok(output) => ToolCallRecord {
                tool: tool.name().to_string(),
                input,
                output: Some(output),
                error: None,
            },
            Err(e) => ToolCallRecord {
                tool: tool.name().to_string(),
                input,
                output: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry_with_echo() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(FnTool::new("web_search", |input| {
            Ok(json!({ "echo": input }))
        }));
        registry
    }

    #[tokio::test]
    async fn test_invoke_success_captures_output() {
        let registry = registry_with_echo();
        let record = registry.invoke("web_search", json!({"q": "rust"})).await;
        assert!(record.succeeded());
        assert_eq!(record.output.unwrap()["echo"]["q"], "rust");
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let registry = registry_with_echo();
        let record = registry.invoke("Web_Search", json!({})).await;
        assert!(record.succeeded());
        assert_eq!(record.tool, "web_search");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error_record() {
        let registry = registry_with_echo();
        let record = registry.invoke("launch_rocket", json!({})).await;
        assert!(!record.succeeded());
        assert!(record.error.unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_failing_tool_never_throws() {
        let mut registry = ToolRegistry::new();
        registry.register(FnTool::new("flaky", |_| {
            Err(CoreError::Tool("backend unavailable".to_string()))
        }));
        let record = registry.invoke("flaky", json!({"n": 1})).await;
        assert_eq!(record.input["n"], 1);
        assert!(record.error.unwrap().contains("backend unavailable"));
    }
}
