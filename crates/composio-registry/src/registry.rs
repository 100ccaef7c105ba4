//! Registry of locally executable actions and their schemas

use crate::{
    error::{RegistryError, RegistryResult},
    handler::ActionHandler,
};
use async_trait::async_trait;
use composio_core::{ActionCatalog, ActionName, ActionSchema, AppName, CoreResult};
use jsonschema::JSONSchema;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) struct RegisteredAction {
    pub(crate) schema: ActionSchema,
    validator: JSONSchema,
    pub(crate) handler: Arc<dyn ActionHandler>,
}

impl RegisteredAction {
    /// Check params against the action's schema, collecting every violation
    pub(crate) fn validate(&self, params: &JsonValue) -> Result<(), String> {
        if !params.is_object() {
            return Err("params must be a JSON object".to_string());
        }
        if let Err(errors) = self.validator.validate(params) {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect();
            return Err(messages.join("; "));
        }
        Ok(())
    }
}

/// Maps action names to schemas and handlers
#[derive(Default)]
pub struct HandlerRegistry {
    actions: HashMap<ActionName, RegisteredAction>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler; its schema is compiled up front
    pub fn register(
        &mut self,
        schema: ActionSchema,
        handler: Arc<dyn ActionHandler>,
    ) -> RegistryResult<()> {
        if self.actions.contains_key(&schema.name) {
            return Err(RegistryError::DuplicateAction(schema.name.to_string()));
        }
        let validator =
            JSONSchema::compile(&schema.parameters).map_err(|e| RegistryError::InvalidSchema {
                action: schema.name.to_string(),
                reason: e.to_string(),
            })?;
        self.actions.insert(
            schema.name.clone(),
            RegisteredAction {
                schema,
                validator,
                handler,
            },
        );
        Ok(())
    }

    /// Builder-style [`HandlerRegistry::register`]
    pub fn with_action(
        mut self,
        schema: ActionSchema,
        handler: Arc<dyn ActionHandler>,
    ) -> RegistryResult<Self> {
        self.register(schema, handler)?;
        Ok(self)
    }

    pub fn schema(&self, name: &ActionName) -> Option<&ActionSchema> {
        self.actions.get(name).map(|a| &a.schema)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn get(&self, name: &ActionName) -> Option<&RegisteredAction> {
        self.actions.get(name)
    }
}

#[async_trait]
impl ActionCatalog for HandlerRegistry {
    async fn get_action(&self, name: &ActionName) -> CoreResult<Option<ActionSchema>> {
        Ok(self.schema(name).cloned())
    }

    async fn list_actions(&self, app: Option<&AppName>) -> CoreResult<Vec<ActionSchema>> {
        let mut schemas: Vec<ActionSchema> = self
            .actions
            .values()
            .filter(|a| app.map(|app| &a.schema.app == app).unwrap_or(true))
            .map(|a| a.schema.clone())
            .collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(schemas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use serde_json::json;

    fn echo() -> Arc<dyn ActionHandler> {
        Arc::new(FnHandler::new(|_ctx, params| async move { Ok(params) }))
    }

    fn issue_schema() -> ActionSchema {
        ActionSchema::new(
            ActionName::parse("GITHUB_CREATE_AN_ISSUE").unwrap(),
            "Create an issue",
            json!({
                "type": "object",
                "properties": {
                    "owner": {"type": "string"},
                    "repo": {"type": "string"},
                    "title": {"type": "string"},
                    "body": {"type": "string"}
                },
                "required": ["owner", "repo", "title"]
            }),
        )
    }

    #[test]
    fn rejects_duplicate_registration() {
        let mut registry = HandlerRegistry::new();
        registry.register(issue_schema(), echo()).unwrap();
        let err = registry.register(issue_schema(), echo()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateAction(_)));
    }

    #[test]
    fn rejects_uncompilable_schema() {
        let schema = ActionSchema::new(
            ActionName::parse("GMAIL_SEND_EMAIL").unwrap(),
            "",
            json!({"type": "not-a-type"}),
        );
        let err = HandlerRegistry::new().register(schema, echo()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
    }

    #[test]
    fn validation_reports_missing_and_mistyped_params() {
        let registry = HandlerRegistry::new()
            .with_action(issue_schema(), echo())
            .unwrap();
        let entry = registry
            .get(&ActionName::parse("GITHUB_CREATE_AN_ISSUE").unwrap())
            .unwrap();

        assert!(entry
            .validate(&json!({"owner": "composiohq", "repo": "agi", "title": "New Issue"}))
            .is_ok());

        let missing = entry.validate(&json!({"owner": "composiohq"})).unwrap_err();
        assert!(missing.contains("repo"));
        assert!(missing.contains("title"));

        let mistyped = entry
            .validate(&json!({"owner": 1, "repo": "agi", "title": "t"}))
            .unwrap_err();
        assert!(mistyped.contains("/owner"));

        assert!(entry.validate(&json!(["not", "an", "object"])).is_err());
    }

    #[tokio::test]
    async fn catalog_filters_by_app() {
        let gmail = ActionSchema::new(
            ActionName::parse("GMAIL_SEND_EMAIL").unwrap(),
            "Send an email",
            json!({"type": "object"}),
        );
        let registry = HandlerRegistry::new()
            .with_action(issue_schema(), echo())
            .unwrap()
            .with_action(gmail, echo())
            .unwrap();

        let github = registry.list_actions(Some(&AppName::new("github"))).await.unwrap();
        assert_eq!(github.len(), 1);
        assert_eq!(github[0].name.as_str(), "GITHUB_CREATE_AN_ISSUE");
        assert_eq!(registry.list_actions(None).await.unwrap().len(), 2);
        assert!(registry
            .get_action(&ActionName::parse("SLACK_SEND_MESSAGE").unwrap())
            .await
            .unwrap()
            .is_none());
    }
}
