//! Tool registry and dispatch
//!
//! Tools are registered once at startup; their descriptors are static
//! for the session. Dispatch validates arguments against the declared
//! schema before a handler ever runs, and every failure mode produces
//! content suitable for a `tool` message so the transcript stays
//! consistent even when the backend asks for something impossible.

pub mod adventure;
pub mod fraud;
pub mod grocery;
pub mod lead;
mod schema;
pub mod wellness;

use crate::llm::{ToolDefinition, ToolInvocation};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result from tool execution
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub success: bool,
    pub output: String,
    /// A terminal result ends the session: the orchestrator speaks
    /// `output` directly and makes no finalizing backend call.
    pub terminal: bool,
}

impl ToolOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            terminal: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: message.into(),
            terminal: false,
        }
    }

    /// A successful result that also ends the session (order placed,
    /// case closed, game over).
    pub fn terminal(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            terminal: true,
        }
    }
}

/// Trait for tools the backend may invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name
    fn name(&self) -> &str;

    /// Tool description surfaced to the backend
    fn description(&self) -> String;

    /// JSON schema for tool input
    fn input_schema(&self) -> Value;

    /// Execute the tool. Input has already been validated against
    /// `input_schema`.
    async fn run(&self, input: Value) -> ToolOutput;
}

/// Dispatch failures; the text becomes the tool result content
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

/// Collection of tools available to one session
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Call before the first turn; the descriptor list
    /// handed to the backend never changes mid-session.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug_assert!(
            !self.tools.iter().any(|t| t.name() == tool.name()),
            "duplicate tool name"
        );
        self.tools.push(tool);
    }

    /// All tool definitions for the backend
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute one invocation: resolve the handler by name, validate
    /// the arguments against its schema, run it. The handler is never
    /// invoked on a validation failure.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> Result<ToolOutput, DispatchError> {
        let Some(tool) = self.tools.iter().find(|t| t.name() == invocation.name) else {
            return Err(DispatchError::UnknownTool(invocation.name.clone()));
        };

        if let Err(reason) = schema::validate(&tool.input_schema(), &invocation.arguments) {
            return Err(DispatchError::InvalidArguments {
                tool: invocation.name.clone(),
                reason,
            });
        }

        tracing::info!(tool = %invocation.name, id = %invocation.id, "executing tool");
        Ok(tool.run(invocation.arguments.clone()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> String {
            "Echo the text back".to_string()
        }

        fn input_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string"}
                },
                "required": ["text"]
            })
        }

        async fn run(&self, input: Value) -> ToolOutput {
            ToolOutput::success(input["text"].as_str().unwrap_or_default())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry
    }

    fn invocation(name: &str, arguments: Value) -> ToolInvocation {
        ToolInvocation {
            id: "call_1".into(),
            name: name.into(),
            arguments,
        }
    }

    #[tokio::test]
    async fn dispatch_runs_registered_tool() {
        let out = registry()
            .dispatch(&invocation("echo", json!({"text": "hello"})))
            .await
            .unwrap();
        assert!(out.success);
        assert_eq!(out.output, "hello");
    }

    #[tokio::test]
    async fn unknown_tool_does_not_raise() {
        let err = registry()
            .dispatch(&invocation("missing", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::UnknownTool("missing".into()));
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_handler() {
        let err = registry()
            .dispatch(&invocation("echo", json!({"text": 42})))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { .. }));

        let err = registry()
            .dispatch(&invocation("echo", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { .. }));
    }

    #[test]
    fn definitions_expose_schema() {
        let defs = registry().definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].input_schema["required"][0], "text");
    }
}
