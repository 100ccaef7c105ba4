//! Handler trait implemented by anything that can run one action locally

use crate::error::HandlerError;
use async_trait::async_trait;
use composio_core::{ActionName, ConnectedAccount, EntityId};
use serde_json::Value as JsonValue;
use std::future::Future;

/// Runtime information handed to a handler for one execution
#[derive(Debug, Clone)]
pub struct HandlerContext {
    /// Unique execution ID for tracing
    pub execution_id: String,
    pub action: ActionName,
    /// Identity the request resolved to
    pub entity_id: EntityId,
    /// Credential the request resolved to
    pub connected_account: ConnectedAccount,
}

#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Execute the action with already validated params
    async fn execute(&self, ctx: &HandlerContext, params: JsonValue)
        -> Result<JsonValue, HandlerError>;
}

/// Adapts an async closure into an [`ActionHandler`]
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(HandlerContext, JsonValue) -> Fut + Send + Sync,
        Fut: Future<Output = Result<JsonValue, HandlerError>> + Send,
    {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F>
where
    F: Fn(HandlerContext, JsonValue) -> Fut + Send + Sync,
    Fut: Future<Output = Result<JsonValue, HandlerError>> + Send,
{
    async fn execute(
        &self,
        ctx: &HandlerContext,
        params: JsonValue,
    ) -> Result<JsonValue, HandlerError> {
        (self.0)(ctx.clone(), params).await
    }
}
