//! Local dispatcher honoring the execution contract without the hosted platform

use crate::{
    error::HandlerError,
    handler::HandlerContext,
    registry::HandlerRegistry,
};
use async_trait::async_trait;
use composio_core::{
    resolve_connected_account, sanitize_json_value, ConnectionSource, CoreError, CoreResult,
    ExecuteRequest, ExecuteResponse, ExecutionBackend,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};

/// Options for local dispatch
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Upper bound for a single handler invocation
    pub timeout: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Executes requests against registered handlers, resolving credentials from
/// a [`ConnectionSource`].
#[derive(Clone)]
pub struct LocalDispatcher {
    registry: Arc<HandlerRegistry>,
    connections: Arc<dyn ConnectionSource>,
    config: DispatcherConfig,
}

impl LocalDispatcher {
    pub fn new<C>(registry: HandlerRegistry, connections: C) -> Self
    where
        C: ConnectionSource + 'static,
    {
        Self::from_parts(Arc::new(registry), Arc::new(connections))
    }

    pub fn from_parts(
        registry: Arc<HandlerRegistry>,
        connections: Arc<dyn ConnectionSource>,
    ) -> Self {
        Self {
            registry,
            connections,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    async fn dispatch(
        &self,
        execution_id: String,
        request: ExecuteRequest,
    ) -> CoreResult<ExecuteResponse> {
        let entry = self
            .registry
            .get(&request.action)
            .ok_or_else(|| CoreError::UnknownAction(request.action.to_string()))?;

        debug!(params = %sanitize_json_value(&request.params), "dispatching action");

        if let Err(reason) = entry.validate(&request.params) {
            info!(%reason, "rejecting invalid parameters");
            return Ok(ExecuteResponse::failure(format!("invalid parameters: {}", reason)));
        }

        let account = match resolve_connected_account(
            self.connections.as_ref(),
            &request,
            &entry.schema.app,
        )
        .await
        {
            Ok(account) => account,
            Err(e) if e.is_resolution_failure() => {
                info!(error = %e, "credential resolution failed");
                return Ok(ExecuteResponse::failure(e.to_string()));
            }
            Err(e) => return Err(e),
        };

        let ctx = HandlerContext {
            execution_id,
            entity_id: request.effective_entity_id(),
            action: request.action.clone(),
            connected_account: account,
        };

        let call = entry.handler.execute(&ctx, request.params);
        let outcome = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                CoreError::Timeout(format!(
                    "action {} exceeded {}ms",
                    request.action,
                    limit.as_millis()
                ))
            })?,
            None => call.await,
        };

        match outcome {
            Ok(data) => Ok(ExecuteResponse::success(data)),
            Err(HandlerError::Failed(msg)) => Ok(ExecuteResponse::failure(msg)),
            Err(HandlerError::Transport(msg)) => Err(CoreError::Transport(msg)),
            Err(HandlerError::Internal(msg)) => Err(CoreError::Other(msg)),
        }
    }
}

#[async_trait]
impl ExecutionBackend for LocalDispatcher {
    async fn execute(&self, request: ExecuteRequest) -> CoreResult<ExecuteResponse> {
        let execution_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "execute_action",
            execution_id = %execution_id,
            action = %request.action,
            entity_id = %request.effective_entity_id(),
        );

        async move {
            let start = Instant::now();
            let result = self.dispatch(execution_id, request).await;
            let duration_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(resp) if resp.is_successful() => {
                    info!(duration_ms, "action executed successfully")
                }
                Ok(resp) => info!(
                    duration_ms,
                    error = resp.error().unwrap_or_default(),
                    "action reported failure"
                ),
                Err(e) => warn!(duration_ms, error = %e, "action execution errored"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
