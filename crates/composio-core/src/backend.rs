use crate::error::CoreResult;
use crate::types::{
    ActionName, ActionSchema, AppName, ConnectedAccount, ConnectedAccountId, EntityId,
    ExecuteRequest, ExecuteResponse,
};
use async_trait::async_trait;

/// Anything that can carry out an execution request.
///
/// `Ok` is the structured channel: a response whose `successful` flag may be
/// false for reported failures (missing permissions, invalid parameters, no
/// matching connection). `Err` is reserved for transport-level or unexpected
/// failures.
#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    async fn execute(&self, request: ExecuteRequest) -> CoreResult<ExecuteResponse>;
}

/// Read access to connected accounts
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// All accounts of an entity, optionally narrowed to one app, in any
    /// status
    async fn list_accounts(
        &self,
        entity_id: &EntityId,
        app: Option<&AppName>,
    ) -> CoreResult<Vec<ConnectedAccount>>;

    /// Fetch one account by id
    async fn get_account(&self, id: &ConnectedAccountId) -> CoreResult<Option<ConnectedAccount>>;
}

/// Lookup of action schemas
#[async_trait]
pub trait ActionCatalog: Send + Sync {
    async fn get_action(&self, name: &ActionName) -> CoreResult<Option<ActionSchema>>;

    /// List known actions, optionally for one app only
    async fn list_actions(&self, app: Option<&AppName>) -> CoreResult<Vec<ActionSchema>>;
}
