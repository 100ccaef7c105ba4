use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Identity assumed when a request does not name an entity.
pub const DEFAULT_ENTITY_ID: &str = "default";

static ACTION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]+(_[A-Z0-9]+)*$").expect("valid action name regex"));

/// Remote operation identifier, namespaced by app and operation
/// (e.g. `GITHUB_CREATE_AN_ISSUE`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionName(String);

impl ActionName {
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(CoreError::Invalid("action name must not be empty".to_string()));
        }
        if !ACTION_NAME_RE.is_match(&normalized) {
            return Err(CoreError::Invalid(format!(
                "invalid action name '{}': expected APP_OPERATION made of letters, digits and '_'",
                raw
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// App derived from the action's namespace prefix.
    pub fn app(&self) -> AppName {
        let prefix = self.0.split('_').next().unwrap_or(&self.0);
        AppName::new(prefix)
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ActionName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ActionName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ActionName> for String {
    fn from(value: ActionName) -> Self {
        value.0
    }
}

/// Lowercased external application key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AppName(String);

impl AppName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AppName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for AppName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<AppName> for String {
    fn from(value: AppName) -> Self {
        value.0
    }
}

/// End-user identity on whose behalf actions execute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Effective entity for an optional caller-supplied id. Blank ids count
    /// as omitted.
    pub fn resolve(id: Option<&str>) -> Self {
        match id.map(str::trim) {
            Some(id) if !id.is_empty() => Self(id.to_string()),
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ENTITY_ID
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self(DEFAULT_ENTITY_ID.to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectedAccountId(String);

impl ConnectedAccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectedAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectedAccountId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Initiated,
    Active,
    Failed,
    Expired,
    Disabled,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Initiated => "INITIATED",
            ConnectionStatus::Active => "ACTIVE",
            ConnectionStatus::Failed => "FAILED",
            ConnectionStatus::Expired => "EXPIRED",
            ConnectionStatus::Disabled => "DISABLED",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionStatus::Active)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INITIATED" => Ok(ConnectionStatus::Initiated),
            "ACTIVE" => Ok(ConnectionStatus::Active),
            "FAILED" => Ok(ConnectionStatus::Failed),
            "EXPIRED" => Ok(ConnectionStatus::Expired),
            "DISABLED" => Ok(ConnectionStatus::Disabled),
            other => Err(CoreError::Invalid(format!("unknown connection status: {}", other))),
        }
    }
}

/// Stored credential instance linking an entity to one app session.
/// Carries no secrets; the platform keeps those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedAccount {
    pub id: ConnectedAccountId,
    pub entity_id: EntityId,
    pub app: AppName,
    pub status: ConnectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ConnectedAccount {
    /// Active account created (and last updated) now.
    pub fn new(id: impl Into<String>, entity_id: EntityId, app: AppName) -> Self {
        let now = Utc::now();
        Self {
            id: ConnectedAccountId::new(id),
            entity_id,
            app,
            status: ConnectionStatus::Active,
            created_at: now,
            updated_at: now,
            label: None,
        }
    }

    pub fn with_status(mut self, status: ConnectionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        if self.updated_at < created_at {
            self.updated_at = created_at;
        }
        self
    }
}

fn empty_object() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

/// Execution request as seen by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub action: ActionName,
    #[serde(default = "empty_object")]
    pub params: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_account_id: Option<ConnectedAccountId>,
}

impl ExecuteRequest {
    pub fn new(action: ActionName) -> Self {
        Self {
            action,
            params: empty_object(),
            entity_id: None,
            connected_account_id: None,
        }
    }

    pub fn with_params(mut self, params: JsonValue) -> Self {
        self.params = params;
        self
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_connected_account_id(mut self, id: impl Into<String>) -> Self {
        self.connected_account_id = Some(ConnectedAccountId::new(id));
        self
    }

    /// Identity the request executes as.
    pub fn effective_entity_id(&self) -> EntityId {
        EntityId::resolve(self.entity_id.as_deref())
    }
}

/// Result of an execution. `data` is always present on success and `error`
/// always present on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireExecuteResponse")]
pub struct ExecuteResponse {
    successful: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ExecuteResponse {
    pub fn success(data: JsonValue) -> Self {
        let data = if data.is_null() { empty_object() } else { data };
        Self {
            successful: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            successful: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }

    pub fn data(&self) -> Option<&JsonValue> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Data on success, the error message on failure
    pub fn into_result(self) -> Result<JsonValue, String> {
        if self.successful {
            Ok(self.data.unwrap_or_else(empty_object))
        } else {
            Err(self.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()))
        }
    }
}

const UNKNOWN_ERROR: &str = "unknown error";

/// Response shape as emitted by the platform, including its historical
/// `successfull` spelling.
#[derive(Debug, Deserialize)]
struct WireExecuteResponse {
    #[serde(default)]
    successful: Option<bool>,
    #[serde(default)]
    successfull: Option<bool>,
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    error: Option<JsonValue>,
}

impl From<WireExecuteResponse> for ExecuteResponse {
    fn from(wire: WireExecuteResponse) -> Self {
        let error = match wire.error {
            None | Some(JsonValue::Null) => None,
            Some(JsonValue::String(s)) if s.is_empty() => None,
            Some(JsonValue::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };
        let successful = wire
            .successful
            .or(wire.successfull)
            .unwrap_or(error.is_none());
        if successful {
            ExecuteResponse::success(wire.data.unwrap_or(JsonValue::Null))
        } else {
            ExecuteResponse::failure(error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()))
        }
    }
}

/// Parameter schema of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSchema {
    pub name: ActionName,
    pub app: AppName,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_object_schema")]
    pub parameters: JsonValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<JsonValue>,
}

fn empty_object_schema() -> JsonValue {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl ActionSchema {
    pub fn new(name: ActionName, description: impl Into<String>, parameters: JsonValue) -> Self {
        let app = name.app();
        Self {
            name,
            app,
            description: description.into(),
            parameters,
            response: None,
        }
    }

    pub fn with_app(mut self, app: AppName) -> Self {
        self.app = app;
        self
    }

    pub fn required_params(&self) -> Vec<&str> {
        self.parameters
            .get("required")
            .and_then(|r| r.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_name_normalizes_and_derives_app() {
        let name = ActionName::parse("github_create_an_issue").unwrap();
        assert_eq!(name.as_str(), "GITHUB_CREATE_AN_ISSUE");
        assert_eq!(name.app().as_str(), "github");

        let single = ActionName::parse("SLACKBOT").unwrap();
        assert_eq!(single.app().as_str(), "slackbot");
    }

    #[test]
    fn action_name_rejects_garbage() {
        assert!(ActionName::parse("").is_err());
        assert!(ActionName::parse("GITHUB CREATE").is_err());
        assert!(ActionName::parse("_GITHUB").is_err());
        assert!(ActionName::parse("GITHUB__ISSUE").is_err());
        assert!(serde_json::from_value::<ActionName>(json!("not-valid")).is_err());
    }

    #[test]
    fn entity_resolution_defaults() {
        assert_eq!(EntityId::resolve(None).as_str(), DEFAULT_ENTITY_ID);
        assert_eq!(EntityId::resolve(Some("   ")).as_str(), DEFAULT_ENTITY_ID);
        assert_eq!(EntityId::resolve(Some("alice")).as_str(), "alice");
    }

    #[test]
    fn request_without_entity_uses_default() {
        let req = ExecuteRequest::new(ActionName::parse("GMAIL_SEND_EMAIL").unwrap());
        assert!(req.entity_id.is_none());
        assert!(req.effective_entity_id().is_default());
        assert_eq!(req.params, json!({}));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let req: ExecuteRequest =
            serde_json::from_value(json!({"action": "GITHUB_STAR_A_REPO"})).unwrap();
        assert_eq!(req.params, json!({}));
        assert_eq!(req.effective_entity_id().as_str(), "default");
        assert!(req.connected_account_id.is_none());
    }

    #[test]
    fn success_always_has_data() {
        let resp = ExecuteResponse::success(JsonValue::Null);
        assert!(resp.is_successful());
        assert_eq!(resp.data(), Some(&json!({})));
        assert!(resp.error().is_none());

        let wire: ExecuteResponse = serde_json::from_value(json!({"successful": true})).unwrap();
        assert_eq!(wire.data(), Some(&json!({})));
    }

    #[test]
    fn failure_always_has_error() {
        let wire: ExecuteResponse =
            serde_json::from_value(json!({"successful": false, "data": null})).unwrap();
        assert!(!wire.is_successful());
        assert_eq!(wire.error(), Some("unknown error"));
        assert!(wire.data().is_none());
    }

    #[test]
    fn into_result_splits_channels() {
        let ok = ExecuteResponse::success(json!({"id": 7})).into_result();
        assert_eq!(ok, Ok(json!({"id": 7})));

        let err = ExecuteResponse::failure("missing scope repo").into_result();
        assert_eq!(err, Err("missing scope repo".to_string()));
    }

    #[test]
    fn accepts_platform_spelling_variants() {
        let resp: ExecuteResponse = serde_json::from_value(json!({
            "data": {"html_url": "https://github.com/composiohq/agi/issues/1"},
            "error": null,
            "successfull": true,
            "successful": true
        }))
        .unwrap();
        assert!(resp.is_successful());
        assert_eq!(resp.data().unwrap()["html_url"], "https://github.com/composiohq/agi/issues/1");

        let legacy: ExecuteResponse = serde_json::from_value(json!({
            "successfull": false,
            "error": {"message": "Bad credentials"}
        }))
        .unwrap();
        assert_eq!(legacy.error(), Some(r#"{"message":"Bad credentials"}"#));
    }

    #[test]
    fn serialized_response_omits_absent_side() {
        let ok = serde_json::to_value(ExecuteResponse::success(json!({"id": 1}))).unwrap();
        assert_eq!(ok, json!({"successful": true, "data": {"id": 1}}));

        let err = serde_json::to_value(ExecuteResponse::failure("nope")).unwrap();
        assert_eq!(err, json!({"successful": false, "error": "nope"}));
    }

    #[test]
    fn schema_required_params() {
        let schema = ActionSchema::new(
            ActionName::parse("GITHUB_CREATE_AN_ISSUE").unwrap(),
            "Create an issue",
            json!({
                "type": "object",
                "properties": {"owner": {"type": "string"}, "repo": {"type": "string"}},
                "required": ["owner", "repo"]
            }),
        );
        assert_eq!(schema.app.as_str(), "github");
        assert_eq!(schema.required_params(), vec!["owner", "repo"]);
    }

    #[test]
    fn connection_status_round_trips_wire_form() {
        assert_eq!(serde_json::to_value(ConnectionStatus::Active).unwrap(), json!("ACTIVE"));
        assert_eq!("expired".parse::<ConnectionStatus>().unwrap(), ConnectionStatus::Expired);
        assert!("bogus".parse::<ConnectionStatus>().is_err());
    }
}
