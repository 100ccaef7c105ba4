//! Async HTTP client for the hosted action-execution platform

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::wire::{ErrorBody, ExecuteBody, Listing, WireActionSchema, WireConnectedAccount};
use async_trait::async_trait;
use composio_core::{
    resolve_connected_account, sanitize_json_value, ActionCatalog, ActionName, ActionSchema,
    AppName, ConnectedAccount, ConnectedAccountId, ConnectionSource, CoreResult, EntityId,
    ExecuteRequest, ExecuteResponse, ExecutionBackend,
};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

const API_KEY_HEADER: &str = "x-api-key";

/// Guard against servers that keep reporting more pages
const MAX_PAGES: u32 = 100;

/// Client for executing actions and reading connected accounts and action
/// schemas from the hosted platform.
#[derive(Debug, Clone)]
pub struct ComposioClient {
    http: Client,
    base_url: Url,
    api_key: String,
    config: ClientConfig,
}

impl ComposioClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let api_key = config.api_key.clone().unwrap_or_default();

        // Url::join drops the last segment unless the base ends with '/'
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("composio-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
            config,
        })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Execute one action on the platform.
    ///
    /// Reported failures come back as an unsuccessful [`ExecuteResponse`];
    /// authentication, server and network problems are errors.
    pub async fn execute_action(&self, request: &ExecuteRequest) -> ClientResult<ExecuteResponse> {
        let entity_id = request.effective_entity_id();
        let app = self.app_for(&request.action).await?;

        let mut connected_account_id = request.connected_account_id.clone();
        if self.config.resolve_locally {
            let pinned = ExecuteRequest {
                entity_id: Some(entity_id.to_string()),
                ..request.clone()
            };
            match resolve_connected_account(self, &pinned, &app).await {
                Ok(account) => connected_account_id = Some(account.id),
                Err(e) if e.is_resolution_failure() => {
                    info!(action = %request.action, error = %e, "credential resolution failed");
                    return Ok(ExecuteResponse::failure(e.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let url = self.endpoint(&format!("api/v2/actions/{}/execute", request.action))?;
        let body = ExecuteBody {
            entity_id: entity_id.as_str(),
            connected_account_id: connected_account_id.as_ref().map(|id| id.as_str()),
            app_name: app.as_str(),
            input: &request.params,
        };

        debug!(
            action = %request.action,
            entity_id = %entity_id,
            connected_account_id = ?body.connected_account_id,
            params = %sanitize_json_value(&request.params),
            "executing action"
        );

        let start = Instant::now();
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_success() {
            let parsed: ExecuteResponse = serde_json::from_str(&text)
                .map_err(|e| ClientError::Decode(format!("execute response: {}", e)))?;
            info!(
                action = %request.action,
                successful = parsed.is_successful(),
                duration_ms,
                "action executed"
            );
            return Ok(parsed);
        }

        let reported = ErrorBody::parse(&text);
        match (status, reported) {
            (StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN, message) => {
                let message = message.unwrap_or_else(|| status_text(status, &text));
                Err(ClientError::Unauthorized(message))
            }
            // Only a structured error body counts as a failure the platform reported
            (s, Some(message)) if s.is_client_error() => {
                info!(
                    action = %request.action,
                    status = s.as_u16(),
                    error = %message,
                    duration_ms,
                    "action rejected"
                );
                Ok(ExecuteResponse::failure(message))
            }
            (s, message) => {
                let message = message.unwrap_or_else(|| status_text(s, &text));
                warn!(
                    action = %request.action,
                    status = s.as_u16(),
                    error = %message,
                    "platform error"
                );
                Err(ClientError::Api {
                    status: s.as_u16(),
                    message,
                })
            }
        }
    }

    /// App an action belongs to: the platform's schema when available,
    /// otherwise the action's namespace prefix.
    async fn app_for(&self, action: &ActionName) -> ClientResult<AppName> {
        if !self.config.resolve_locally {
            return Ok(action.app());
        }
        Ok(self
            .get_action(action)
            .await?
            .map(|s| s.app)
            .unwrap_or_else(|| action.app()))
    }

    pub async fn get_action(&self, action: &ActionName) -> ClientResult<Option<ActionSchema>> {
        let url = self.endpoint(&format!("api/v2/actions/{}", action))?;
        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let wire: WireActionSchema = decode(response).await?;
        Ok(Some(wire.into_schema()?))
    }

    pub async fn list_actions(&self, app: Option<&AppName>) -> ClientResult<Vec<ActionSchema>> {
        let mut url = self.endpoint("api/v2/actions")?;
        if let Some(app) = app {
            url.query_pairs_mut().append_pair("apps", app.as_str());
        }
        let listing: Listing<WireActionSchema> = decode(self.get(url).await?).await?;
        let (items, _) = listing.into_parts();
        items
            .into_iter()
            .map(|w| w.into_schema().map_err(ClientError::from))
            .collect()
    }

    /// Accounts of an entity, following pagination
    pub async fn list_connected_accounts(
        &self,
        entity_id: &EntityId,
        app: Option<&AppName>,
        active_only: bool,
    ) -> ClientResult<Vec<ConnectedAccount>> {
        let mut accounts = Vec::new();
        let mut page = 1u32;
        loop {
            let mut url = self.endpoint("api/v1/connectedAccounts")?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("user_uuid", entity_id.as_str());
                if let Some(app) = app {
                    query.append_pair("appNames", app.as_str());
                }
                query.append_pair("showActiveOnly", if active_only { "true" } else { "false" });
                query.append_pair("page", &page.to_string());
            }
            let listing: Listing<WireConnectedAccount> = decode(self.get(url).await?).await?;
            let (items, total_pages) = listing.into_parts();
            accounts.extend(items.into_iter().map(|w| w.into_account(entity_id)));

            if page >= total_pages || page >= MAX_PAGES {
                break;
            }
            page += 1;
        }

        // The platform filters by entity on its side; drop anything that slipped through
        accounts.retain(|a| &a.entity_id == entity_id);
        if let Some(app) = app {
            accounts.retain(|a| &a.app == app);
        }
        debug!(entity_id = %entity_id, count = accounts.len(), "listed connected accounts");
        Ok(accounts)
    }

    pub async fn get_connected_account(
        &self,
        id: &ConnectedAccountId,
    ) -> ClientResult<Option<ConnectedAccount>> {
        let url = self.endpoint(&format!("api/v1/connectedAccounts/{}", id))?;
        let response = self.get(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let wire: WireConnectedAccount = decode(response).await?;
        Ok(Some(wire.into_account(&EntityId::default())))
    }

    async fn get(&self, url: Url) -> ClientResult<Response> {
        Ok(self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?)
    }
}

fn status_text(status: StatusCode, body: &str) -> String {
    let reason = status.canonical_reason().unwrap_or("error");
    let body = body.trim();
    if body.is_empty() {
        reason.to_string()
    } else {
        let snippet: String = body.chars().take(200).collect();
        format!("{}: {}", reason, snippet)
    }
}

/// Decode a successful JSON body, mapping error statuses
async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let text = response.text().await?;
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ClientError::Unauthorized(
            ErrorBody::parse(&text).unwrap_or_else(|| status_text(status, &text)),
        ));
    }
    if !status.is_success() {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: ErrorBody::parse(&text).unwrap_or_else(|| status_text(status, &text)),
        });
    }
    serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))
}

#[async_trait]
impl ExecutionBackend for ComposioClient {
    async fn execute(&self, request: ExecuteRequest) -> CoreResult<ExecuteResponse> {
        Ok(self.execute_action(&request).await?)
    }
}

#[async_trait]
impl ConnectionSource for ComposioClient {
    async fn list_accounts(
        &self,
        entity_id: &EntityId,
        app: Option<&AppName>,
    ) -> CoreResult<Vec<ConnectedAccount>> {
        Ok(self.list_connected_accounts(entity_id, app, false).await?)
    }

    async fn get_account(&self, id: &ConnectedAccountId) -> CoreResult<Option<ConnectedAccount>> {
        Ok(self.get_connected_account(id).await?)
    }
}

#[async_trait]
impl ActionCatalog for ComposioClient {
    async fn get_action(&self, name: &ActionName) -> CoreResult<Option<ActionSchema>> {
        Ok(ComposioClient::get_action(self, name).await?)
    }

    async fn list_actions(&self, app: Option<&AppName>) -> CoreResult<Vec<ActionSchema>> {
        Ok(ComposioClient::list_actions(self, app).await?)
    }
}
