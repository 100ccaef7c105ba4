use crate::{
    backend::ConnectionSource,
    error::CoreResult,
    types::{AppName, ConnectedAccount, ConnectedAccountId, ConnectionStatus, EntityId},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory connected account source for offline use and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryConnectionSource {
    data: Arc<RwLock<HashMap<ConnectedAccountId, ConnectedAccount>>>,
}

impl MemoryConnectionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_accounts(accounts: impl IntoIterator<Item = ConnectedAccount>) -> Self {
        let source = Self::new();
        for account in accounts {
            source.insert(account).await;
        }
        source
    }

    /// Insert or replace an account
    pub async fn insert(&self, account: ConnectedAccount) {
        let mut data = self.data.write().await;
        data.insert(account.id.clone(), account);
    }

    pub async fn remove(&self, id: &ConnectedAccountId) -> bool {
        let mut data = self.data.write().await;
        data.remove(id).is_some()
    }

    /// Change an account's status, returns false when the id is unknown
    pub async fn set_status(&self, id: &ConnectedAccountId, status: ConnectionStatus) -> bool {
        let mut data = self.data.write().await;
        match data.get_mut(id) {
            Some(account) => {
                account.status = status;
                account.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl ConnectionSource for MemoryConnectionSource {
    async fn list_accounts(
        &self,
        entity_id: &EntityId,
        app: Option<&AppName>,
    ) -> CoreResult<Vec<ConnectedAccount>> {
        let data = self.data.read().await;
        let mut results: Vec<ConnectedAccount> = data
            .values()
            .filter(|a| &a.entity_id == entity_id)
            .filter(|a| app.map(|app| &a.app == app).unwrap_or(true))
            .cloned()
            .collect();
        results.sort_by_key(|a| std::cmp::Reverse(a.created_at));
        Ok(results)
    }

    async fn get_account(&self, id: &ConnectedAccountId) -> CoreResult<Option<ConnectedAccount>> {
        let data = self.data.read().await;
        Ok(data.get(id).cloned())
    }
}
