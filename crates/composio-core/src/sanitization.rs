//! Masking of credential-like values before they reach logs or error text

use serde_json::{Map, Value as JsonValue};

/// Field names masked wherever they appear
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "passwd",
    "token",
    "access_token",
    "refresh_token",
    "id_token",
    "client_secret",
    "api_key",
    "apikey",
    "authorization",
    "secret",
    "private_key",
    "credential",
    "credentials",
    "connection_params",
];

/// Substrings that mark a field as sensitive (case-insensitive)
const SENSITIVE_PATTERNS: &[&str] = &["_key", "_token", "_secret", "_password"];

const REDACTED: &str = "***REDACTED***";

pub fn is_sensitive_field(field_name: &str) -> bool {
    let lower = field_name.to_ascii_lowercase();
    SENSITIVE_FIELDS.iter().any(|&f| lower == f)
        || SENSITIVE_PATTERNS.iter().any(|&p| lower.contains(p))
}

/// Copy of `value` with every sensitive scalar replaced by a placeholder.
pub fn sanitize_json_value(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => {
            let sanitized: Map<String, JsonValue> = map
                .iter()
                .map(|(key, val)| {
                    let val = match val {
                        JsonValue::String(_) | JsonValue::Number(_) | JsonValue::Bool(_)
                            if is_sensitive_field(key) =>
                        {
                            JsonValue::String(REDACTED.to_string())
                        }
                        other => sanitize_json_value(other),
                    };
                    (key.clone(), val)
                })
                .collect();
            JsonValue::Object(sanitized)
        }
        JsonValue::Array(items) => {
            JsonValue::Array(items.iter().map(sanitize_json_value).collect())
        }
        other => other.clone(),
    }
}

/// Show only the first and last characters of a secret, e.g. an API key
/// written to debug logs.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_nested_credentials() {
        let input = json!({
            "owner": "composiohq",
            "auth": {"access_token": "gho_abc", "scopes": ["repo"]},
            "items": [{"api_key": 42}]
        });
        let out = sanitize_json_value(&input);
        assert_eq!(out["owner"], "composiohq");
        assert_eq!(out["auth"]["access_token"], REDACTED);
        assert_eq!(out["auth"]["scopes"], json!(["repo"]));
        assert_eq!(out["items"][0]["api_key"], REDACTED);
    }

    #[test]
    fn pattern_matching_is_case_insensitive() {
        assert!(is_sensitive_field("GITHUB_TOKEN"));
        assert!(is_sensitive_field("Client_Secret"));
        assert!(!is_sensitive_field("title"));
    }

    #[test]
    fn masks_secrets_for_display() {
        assert_eq!(mask_secret("short"), "*****");
        assert_eq!(mask_secret("ak_1234567890"), "ak_1…7890");
    }
}
