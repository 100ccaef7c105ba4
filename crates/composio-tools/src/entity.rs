//! Per-user handles

use composio_core::{
    resolve_account, ActionName, AppName, ConnectedAccount, ConnectionSource, CoreError,
    CoreResult, EntityId, ExecuteRequest, ExecuteResponse, ExecutionBackend,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Executes actions and looks up connections on behalf of one entity
#[derive(Clone)]
pub struct Entity {
    id: EntityId,
    backend: Arc<dyn ExecutionBackend>,
    connections: Option<Arc<dyn ConnectionSource>>,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        backend: Arc<dyn ExecutionBackend>,
        connections: Option<Arc<dyn ConnectionSource>>,
    ) -> Self {
        Self {
            id,
            backend,
            connections,
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub async fn execute(
        &self,
        action: &ActionName,
        params: JsonValue,
    ) -> CoreResult<ExecuteResponse> {
        let request = ExecuteRequest::new(action.clone())
            .with_params(params)
            .with_entity_id(self.id.as_str());
        self.backend.execute(request).await
    }

    /// Like [`Entity::execute`] but on one specific connected account
    pub async fn execute_with_account(
        &self,
        action: &ActionName,
        params: JsonValue,
        connected_account_id: &str,
    ) -> CoreResult<ExecuteResponse> {
        let request = ExecuteRequest::new(action.clone())
            .with_params(params)
            .with_entity_id(self.id.as_str())
            .with_connected_account_id(connected_account_id);
        self.backend.execute(request).await
    }

    /// Connection an execution for `app` would use when no account is named
    pub async fn get_connection(&self, app: &AppName) -> CoreResult<ConnectedAccount> {
        resolve_account(self.source()?, &self.id, None, app).await
    }

    pub async fn connections(&self, app: Option<&AppName>) -> CoreResult<Vec<ConnectedAccount>> {
        self.source()?.list_accounts(&self.id, app).await
    }

    fn source(&self) -> CoreResult<&dyn ConnectionSource> {
        self.connections.as_deref().ok_or_else(|| {
            CoreError::Invalid("no connection source configured for this tool set".to_string())
        })
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity").field("id", &self.id).finish()
    }
}
