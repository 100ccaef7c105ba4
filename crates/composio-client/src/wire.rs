//! Payload shapes exchanged with the hosted platform

use chrono::{DateTime, Utc};
use composio_core::{
    ActionName, ActionSchema, AppName, ConnectedAccount, ConnectedAccountId, ConnectionStatus,
    EntityId,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecuteBody<'a> {
    pub entity_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_account_id: Option<&'a str>,
    pub app_name: &'a str,
    pub input: &'a JsonValue,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<JsonValue>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed.message.filter(|m| !m.is_empty()).or_else(|| match parsed.error? {
            JsonValue::String(s) if !s.is_empty() => Some(s),
            JsonValue::Null => None,
            other => Some(other.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireActionSchema {
    pub name: String,
    #[serde(default)]
    pub app_key: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<JsonValue>,
    #[serde(default)]
    pub response: Option<JsonValue>,
}

impl WireActionSchema {
    pub fn into_schema(self) -> Result<ActionSchema, composio_core::CoreError> {
        let name = ActionName::parse(&self.name)?;
        let app = self
            .app_key
            .or(self.app_name)
            .map(AppName::new)
            .unwrap_or_else(|| name.app());
        let parameters = self
            .parameters
            .unwrap_or_else(|| serde_json::json!({"type": "object", "properties": {}}));
        let mut schema = ActionSchema::new(name, self.description.unwrap_or_default(), parameters)
            .with_app(app);
        schema.response = self.response;
        Ok(schema)
    }
}

/// Listing payloads come either wrapped in `items` or as a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Paged {
        items: Vec<T>,
        #[serde(default, rename = "totalPages")]
        total_pages: Option<u32>,
    },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_parts(self) -> (Vec<T>, u32) {
        match self {
            Listing::Paged { items, total_pages } => (items, total_pages.unwrap_or(1)),
            Listing::Bare(items) => (items, 1),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireConnectedAccount {
    pub id: String,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub app_unique_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub client_unique_user_id: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub label: Option<String>,
}

impl WireConnectedAccount {
    /// `fallback_entity` fills in accounts whose payload omits the entity
    pub fn into_account(self, fallback_entity: &EntityId) -> ConnectedAccount {
        let status = match self.status.as_deref().map(str::parse::<ConnectionStatus>) {
            Some(Ok(status)) => status,
            Some(Err(_)) | None => {
                warn!(
                    connected_account_id = %self.id,
                    status = ?self.status,
                    "unrecognized connection status"
                );
                ConnectionStatus::Disabled
            }
        };
        let entity_id = self
            .client_unique_user_id
            .or(self.entity_id)
            .map(EntityId::new)
            .unwrap_or_else(|| fallback_entity.clone());
        let app = self
            .app_name
            .or(self.app_unique_id)
            .map(AppName::new)
            .unwrap_or_else(|| AppName::new("unknown"));

        ConnectedAccount {
            id: ConnectedAccountId::new(self.id),
            entity_id,
            app,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at.unwrap_or(self.created_at),
            label: self.label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_body_prefers_message() {
        assert_eq!(
            ErrorBody::parse(r#"{"message": "Invalid request data", "error": "x"}"#),
            Some("Invalid request data".to_string())
        );
        assert_eq!(
            ErrorBody::parse(r#"{"error": {"code": 7}}"#),
            Some(r#"{"code":7}"#.to_string())
        );
        assert_eq!(ErrorBody::parse("<html>"), None);
    }

    #[test]
    fn connected_account_maps_platform_fields() {
        let wire: WireConnectedAccount = serde_json::from_value(json!({
            "id": "ca_1",
            "appName": "GitHub",
            "status": "ACTIVE",
            "clientUniqueUserId": "alice",
            "createdAt": "2024-05-01T12:00:00.000Z",
            "updatedAt": "2024-05-02T12:00:00.000Z",
            "integrationId": "ignored"
        }))
        .unwrap();
        let account = wire.into_account(&EntityId::default());
        assert_eq!(account.app.as_str(), "github");
        assert_eq!(account.entity_id.as_str(), "alice");
        assert!(account.status.is_active());
        assert!(account.updated_at > account.created_at);
    }

    #[test]
    fn unknown_status_is_not_usable() {
        let wire: WireConnectedAccount = serde_json::from_value(json!({
            "id": "ca_2",
            "appName": "gmail",
            "status": "PENDING_REVIEW",
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();
        let account = wire.into_account(&EntityId::new("bob"));
        assert_eq!(account.status, ConnectionStatus::Disabled);
        assert_eq!(account.entity_id.as_str(), "bob");
    }

    #[test]
    fn schema_app_key_wins_over_prefix() {
        let wire: WireActionSchema = serde_json::from_value(json!({
            "name": "GOOGLECALENDAR_CREATE_EVENT",
            "appKey": "googlecalendar",
            "appName": "Google Calendar",
            "description": "Create an event",
            "parameters": {"type": "object", "required": ["start_datetime"]}
        }))
        .unwrap();
        let schema = wire.into_schema().unwrap();
        assert_eq!(schema.app.as_str(), "googlecalendar");
        assert_eq!(schema.required_params(), vec!["start_datetime"]);
    }
}
