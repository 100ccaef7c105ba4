//! Tool sets: the entry point frameworks and procedural callers share

use crate::entity::Entity;
use crate::error::{ToolError, ToolResult};
use crate::tool::{ExecutionBinding, Tool, ToolCall, ToolCallOutput};
use composio_core::{
    ActionCatalog, ActionName, AppName, ConnectedAccountId, ConnectionSource, CoreResult, EntityId,
    ExecuteResponse, ExecutionBackend,
};
use futures::future::join_all;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct ToolSet {
    binding: ExecutionBinding,
    catalog: Arc<dyn ActionCatalog>,
    connections: Option<Arc<dyn ConnectionSource>>,
}

impl ToolSet {
    pub fn new(backend: Arc<dyn ExecutionBackend>, catalog: Arc<dyn ActionCatalog>) -> Self {
        Self {
            binding: ExecutionBinding {
                backend,
                entity_id: None,
                connected_account_id: None,
            },
            catalog,
            connections: None,
        }
    }

    /// Tool set over a client that executes, serves schemas and lists
    /// connected accounts at once
    pub fn from_client<T>(client: Arc<T>) -> Self
    where
        T: ExecutionBackend + ActionCatalog + ConnectionSource + 'static,
    {
        let backend: Arc<dyn ExecutionBackend> = client.clone();
        let catalog: Arc<dyn ActionCatalog> = client.clone();
        let connections: Arc<dyn ConnectionSource> = client;
        Self::new(backend, catalog).with_connection_source(connections)
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.binding.entity_id = Some(entity_id.into());
        self
    }

    /// Pin every execution to one connected account
    pub fn with_connected_account_id(mut self, id: impl Into<String>) -> Self {
        self.binding.connected_account_id = Some(ConnectedAccountId::new(id));
        self
    }

    pub fn with_connection_source(mut self, connections: Arc<dyn ConnectionSource>) -> Self {
        self.connections = Some(connections);
        self
    }

    /// Identity executions run as
    pub fn entity_id(&self) -> EntityId {
        EntityId::resolve(self.binding.entity_id.as_deref())
    }

    pub fn entity(&self, id: impl Into<String>) -> Entity {
        let id: String = id.into();
        Entity::new(
            EntityId::resolve(Some(id.as_str())),
            self.binding.backend.clone(),
            self.connections.clone(),
        )
    }

    pub async fn get_tools(&self, actions: &[ActionName]) -> ToolResult<Vec<Tool>> {
        let mut tools = Vec::with_capacity(actions.len());
        for action in actions {
            let schema = self
                .catalog
                .get_action(action)
                .await?
                .ok_or_else(|| ToolError::UnknownAction(action.to_string()))?;
            tools.push(Tool::new(schema, self.binding.clone()));
        }
        debug!(count = tools.len(), "built tools");
        Ok(tools)
    }

    pub async fn get_tools_for_app(&self, app: &AppName) -> ToolResult<Vec<Tool>> {
        let schemas = self.catalog.list_actions(Some(app)).await?;
        Ok(schemas
            .into_iter()
            .map(|s| Tool::new(s, self.binding.clone()))
            .collect())
    }

    /// Direct procedural execution with this tool set's identity defaults
    pub async fn execute_action(
        &self,
        action: &ActionName,
        params: JsonValue,
    ) -> CoreResult<ExecuteResponse> {
        self.binding.execute(action.clone(), params).await
    }

    pub async fn handle_tool_call(&self, call: &ToolCall) -> ToolResult<ToolCallOutput> {
        let action = ActionName::parse(&call.name)
            .map_err(|_| ToolError::UnknownAction(call.name.clone()))?;
        let params = parse_arguments(call)?;

        let response = self.execute_action(&action, params).await?;
        info!(
            tool_call_id = %call.id,
            action = %action,
            successful = response.is_successful(),
            "handled tool call"
        );
        Ok(ToolCallOutput::from_response(call, &response))
    }

    /// Run every call concurrently. Output order matches input order; calls
    /// that error are logged and reported back as failures so the loop can
    /// continue.
    pub async fn handle_tool_calls(&self, calls: &[ToolCall]) -> Vec<ToolCallOutput> {
        let outcomes = join_all(calls.iter().map(|call| self.handle_tool_call(call))).await;
        calls
            .iter()
            .zip(outcomes)
            .map(|(call, outcome)| match outcome {
                Ok(output) => output,
                Err(e) => {
                    error!(
                        tool_call_id = %call.id,
                        tool = %call.name,
                        error = %e,
                        "tool call failed"
                    );
                    let failure = ExecuteResponse::failure(e.to_string());
                    ToolCallOutput::from_response(call, &failure)
                }
            })
            .collect()
    }
}

fn parse_arguments(call: &ToolCall) -> ToolResult<JsonValue> {
    if call.arguments.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }
    let value: JsonValue =
        serde_json::from_str(&call.arguments).map_err(|e| ToolError::InvalidArguments {
            tool: call.name.clone(),
            reason: e.to_string(),
        })?;
    if !value.is_object() {
        return Err(ToolError::InvalidArguments {
            tool: call.name.clone(),
            reason: "arguments must be a JSON object".to_string(),
        });
    }
    Ok(value)
}
