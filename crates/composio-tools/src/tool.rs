//! Tool wrappers handed to LLM orchestration frameworks

use composio_core::{
    ActionName, ActionSchema, ConnectedAccountId, CoreResult, ExecuteRequest, ExecuteResponse,
    ExecutionBackend,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;

/// Where and as whom a tool executes
#[derive(Clone)]
pub(crate) struct ExecutionBinding {
    pub(crate) backend: Arc<dyn ExecutionBackend>,
    pub(crate) entity_id: Option<String>,
    pub(crate) connected_account_id: Option<ConnectedAccountId>,
}

impl ExecutionBinding {
    pub(crate) fn request(&self, action: ActionName, params: JsonValue) -> ExecuteRequest {
        ExecuteRequest {
            action,
            params,
            entity_id: self.entity_id.clone(),
            connected_account_id: self.connected_account_id.clone(),
        }
    }

    pub(crate) async fn execute(
        &self,
        action: ActionName,
        params: JsonValue,
    ) -> CoreResult<ExecuteResponse> {
        self.backend.execute(self.request(action, params)).await
    }
}

/// Function definition in the shape OpenAI-compatible tool callers expect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    pub parameters: JsonValue,
}

/// One action exposed to a tool-calling loop: its schema plus an execution
/// callback bound to a backend and identity.
#[derive(Clone)]
pub struct Tool {
    schema: ActionSchema,
    binding: ExecutionBinding,
}

impl Tool {
    pub(crate) fn new(schema: ActionSchema, binding: ExecutionBinding) -> Self {
        Self { schema, binding }
    }

    pub fn name(&self) -> &str {
        self.schema.name.as_str()
    }

    pub fn action(&self) -> &ActionName {
        &self.schema.name
    }

    pub fn description(&self) -> &str {
        &self.schema.description
    }

    pub fn parameters(&self) -> &JsonValue {
        &self.schema.parameters
    }

    pub fn schema(&self) -> &ActionSchema {
        &self.schema
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.schema.description.clone(),
                parameters: self.schema.parameters.clone(),
            },
        }
    }

    /// Execution callback invoked by the framework with the model's arguments
    pub async fn execute(&self, args: JsonValue) -> CoreResult<ExecuteResponse> {
        self.binding.execute(self.schema.name.clone(), args).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.schema.name)
            .field("app", &self.schema.app)
            .field("entity_id", &self.binding.entity_id)
            .finish()
    }
}

/// A model's request to run one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments as produced by the model
    #[serde(default)]
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Read an OpenAI-style `{"id", "function": {"name", "arguments"}}` entry
    pub fn from_openai(value: &JsonValue) -> Option<Self> {
        let id = value.get("id")?.as_str()?;
        let function = value.get("function")?;
        let name = function.get("name")?.as_str()?;
        let arguments = match function.get("arguments") {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Some(Self::new(id, name, arguments))
    }
}

/// Result of a tool call, ready to be fed back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallOutput {
    pub tool_call_id: String,
    pub name: String,
    pub successful: bool,
    /// Serialized execution response
    pub content: String,
}

impl ToolCallOutput {
    pub fn from_response(call: &ToolCall, response: &ExecuteResponse) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            successful: response.is_successful(),
            content: serde_json::to_string(response).unwrap_or_else(|_| {
                r#"{"successful":false,"error":"unserializable response"}"#.to_string()
            }),
        }
    }

    /// Message in the OpenAI `tool` role format
    pub fn to_message(&self) -> JsonValue {
        serde_json::json!({
            "role": "tool",
            "tool_call_id": self.tool_call_id,
            "content": self.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_openai_tool_calls() {
        let call = ToolCall::from_openai(&json!({
            "id": "call_abc",
            "type": "function",
            "function": {"name": "GITHUB_CREATE_AN_ISSUE", "arguments": "{\"title\":\"x\"}"}
        }))
        .unwrap();
        assert_eq!(call.id, "call_abc");
        assert_eq!(call.name, "GITHUB_CREATE_AN_ISSUE");
        assert_eq!(call.arguments, r#"{"title":"x"}"#);

        let object_args = ToolCall::from_openai(&json!({
            "id": "call_def",
            "function": {"name": "GMAIL_SEND_EMAIL", "arguments": {"to": "a@b.c"}}
        }))
        .unwrap();
        assert_eq!(object_args.arguments, r#"{"to":"a@b.c"}"#);

        assert!(ToolCall::from_openai(&json!({"id": "x"})).is_none());
    }

    #[test]
    fn output_message_carries_serialized_response() {
        let call = ToolCall::new("call_1", "GMAIL_SEND_EMAIL", "{}");
        let out = ToolCallOutput::from_response(&call, &ExecuteResponse::failure("quota exceeded"));
        assert!(!out.successful);
        assert_eq!(out.content, r#"{"successful":false,"error":"quota exceeded"}"#);
        assert_eq!(out.to_message()["role"], "tool");
        assert_eq!(out.to_message()["tool_call_id"], "call_1");
    }
}
