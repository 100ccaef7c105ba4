//! Client configuration
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! `COMPOSIO_*` environment variables. String values in the file may contain
//! `${VAR}` or `${VAR:default}` placeholders; an expanded value is re-typed so
//! `timeout_secs: ${TIMEOUT:30}` yields a number.

use crate::error::{ClientError, ClientResult};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://backend.composio.dev";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const ENV_API_KEY: &str = "COMPOSIO_API_KEY";
pub const ENV_BASE_URL: &str = "COMPOSIO_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "COMPOSIO_TIMEOUT_SECS";
pub const ENV_ENTITY_ID: &str = "COMPOSIO_ENTITY_ID";
pub const ENV_RESOLVE_LOCALLY: &str = "COMPOSIO_RESOLVE_LOCALLY";

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::([^}]*))?\}").expect("valid placeholder regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Resolve the connected account client-side and pin it on every request
    #[serde(default)]
    pub resolve_locally: bool,
    /// Entity for callers that build requests without one. The client itself
    /// never substitutes it; an unnamed entity always runs as `default`.
    #[serde(default)]
    pub default_entity_id: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            resolve_locally: false,
            default_entity_id: None,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_resolve_locally(mut self, enabled: bool) -> Self {
        self.resolve_locally = enabled;
        self
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> ClientResult<Self> {
        let mut config = Self::default();
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from an optional YAML file, then apply the process environment
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content, |key| std::env::var(key).ok())
    }

    /// Parse YAML, expanding placeholders through `lookup`
    pub fn from_yaml_str<F>(content: &str, lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: JsonValue = serde_yaml::from_str(content)?;
        let raw = if raw.is_null() {
            JsonValue::Object(Default::default())
        } else {
            raw
        };
        let expanded = expand_placeholders(&raw, &lookup)?;
        serde_json::from_value(expanded)
            .map_err(|e| ClientError::Config(format!("invalid client config: {}", e)))
    }

    /// Override fields from `COMPOSIO_*` variables found through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> ClientResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?;
        }
        if let Some(entity) = lookup(ENV_ENTITY_ID).filter(|v| !v.trim().is_empty()) {
            self.default_entity_id = Some(entity);
        }
        if let Some(raw) = lookup(ENV_RESOLVE_LOCALLY) {
            let raw = raw.trim().to_ascii_lowercase();
            self.resolve_locally = matches!(raw.as_str(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(ClientError::Config(format!(
                    "API key missing: set {} or pass --api-key",
                    ENV_API_KEY
                )))
            }
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }
}

fn expand_placeholders<F>(value: &JsonValue, lookup: &F) -> ClientResult<JsonValue>
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        JsonValue::String(s) if PLACEHOLDER_RE.is_match(s) => {
            expand_str(s, lookup).map(typed_value)
        }
        JsonValue::Array(items) => items
            .iter()
            .map(|v| expand_placeholders(v, lookup))
            .collect::<ClientResult<Vec<_>>>()
            .map(JsonValue::Array),
        JsonValue::Object(map) => {
            let mut out = serde_json::Map::new();
            for (k, v) in map {
                out.insert(k.clone(), expand_placeholders(v, lookup)?);
            }
            Ok(JsonValue::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn expand_str<F>(input: &str, lookup: &F) -> ClientResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Option<String> = None;
    let expanded = PLACEHOLDER_RE.replace_all(input, |caps: &Captures| {
        let name = &caps[1];
        match (lookup(name), caps.get(2)) {
            (Some(value), _) => value,
            (None, Some(default)) => default.as_str().to_string(),
            (None, None) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(name) => Err(ClientError::Config(format!(
            "environment variable '{}' not found and no default provided",
            name
        ))),
        None => Ok(expanded.into_owned()),
    }
}

/// Re-type an expanded string: JSON-looking text is parsed, then booleans and
/// numbers, and anything else stays a string
fn typed_value(expanded: String) -> JsonValue {
    if expanded.starts_with('{') || expanded.starts_with('[') || expanded.starts_with('"') {
        return serde_json::from_str(&expanded).unwrap_or(JsonValue::String(expanded));
    }
    if let Ok(flag) = expanded.parse::<bool>() {
        JsonValue::Bool(flag)
    } else if let Ok(int) = expanded.parse::<i64>() {
        JsonValue::Number(int.into())
    } else if let Some(num) = expanded
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
    {
        JsonValue::Number(num)
    } else {
        JsonValue::String(expanded)
    }
}
