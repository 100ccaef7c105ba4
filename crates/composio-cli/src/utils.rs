//! Utility functions for the CLI

use crate::cli::Cli;
use crate::error::{CliError, CliResult};
use anyhow::Context;
use colored::{ColoredString, Colorize};
use composio_client::{ClientConfig, ComposioClient};
use composio_core::{mask_secret, EntityId};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize tracing; `RUST_LOG` wins over the verbosity flag
pub fn init_tracing(verbose: bool) -> CliResult<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| CliError::General(format!("Failed to set tracing subscriber: {}", e)))?;

    Ok(())
}

/// Utility for colored console output
pub struct ColoredOutput;

impl ColoredOutput {
    pub fn success(msg: &str) -> ColoredString {
        msg.green().bold()
    }

    pub fn error(msg: &str) -> ColoredString {
        msg.red().bold()
    }

    pub fn warning(msg: &str) -> ColoredString {
        msg.yellow().bold()
    }

    pub fn dim(msg: &str) -> ColoredString {
        msg.dimmed()
    }

    pub fn highlight(msg: &str) -> ColoredString {
        msg.cyan().bold()
    }
}

/// Client configuration from the config file and environment, with explicit
/// flags applied last
pub fn load_client_config(cli: &Cli) -> CliResult<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(key) = cli.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
        config.api_key = Some(key.clone());
    }
    if let Some(url) = cli.base_url.as_ref().filter(|u| !u.trim().is_empty()) {
        config.base_url = url.clone();
    }
    Ok(config)
}

pub fn build_client(cli: &Cli) -> CliResult<ComposioClient> {
    let config = load_client_config(cli)?;
    debug!(
        base_url = %config.base_url,
        api_key = %masked_api_key(&config),
        timeout_secs = config.timeout_secs,
        "Client configuration"
    );
    Ok(ComposioClient::new(config)?)
}

fn masked_api_key(config: &ClientConfig) -> String {
    config
        .api_key
        .as_deref()
        .map(mask_secret)
        .unwrap_or_else(|| "<unset>".to_string())
}

/// Entity a command acts for: the flag, then the configured default
pub fn entity_for(client: &ComposioClient, flag: Option<&str>) -> EntityId {
    entity_or(flag, client.config().default_entity_id.as_deref())
}

/// First non-blank of `flag` and `fallback`, else the default entity
pub fn entity_or(flag: Option<&str>, fallback: Option<&str>) -> EntityId {
    match flag.map(str::trim) {
        Some(id) if !id.is_empty() => EntityId::new(id),
        _ => EntityId::resolve(fallback),
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Validate file exists and is readable
pub fn validate_file_exists(path: &str) -> CliResult<()> {
    if !Path::new(path).exists() {
        return Err(CliError::FileNotFound(path.to_string()));
    }
    Ok(())
}

/// Create parent directories if they don't exist
pub fn ensure_parent_dir(path: &Path) -> CliResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Read action params from an inline JSON string or a JSON/YAML file.
/// Neither given means `{}`.
pub async fn read_params(
    params: Option<String>,
    params_file: Option<String>,
) -> CliResult<JsonValue> {
    let value = match (params, params_file) {
        (Some(raw), None) => serde_json::from_str(&raw)
            .map_err(|e| CliError::InvalidArgument(format!("Invalid JSON params: {}", e)))?,
        (None, Some(file_path)) => {
            validate_file_exists(&file_path)?;
            let content = tokio::fs::read_to_string(&file_path)
                .await
                .with_context(|| format!("reading params file '{}'", file_path))?;

            // JSON first, then YAML
            match serde_json::from_str::<JsonValue>(&content) {
                Ok(value) => value,
                Err(_) => serde_yaml::from_str::<JsonValue>(&content).map_err(|e| {
                    CliError::InvalidArgument(format!(
                        "Invalid JSON/YAML params file '{}': {}",
                        file_path, e
                    ))
                })?,
            }
        }
        (None, None) => return Ok(JsonValue::Object(Default::default())),
        (Some(_), Some(_)) => {
            return Err(CliError::InvalidArgument(
                "Cannot specify both --params and --params-file".to_string(),
            ))
        }
    };

    if !value.is_object() {
        return Err(CliError::InvalidArgument("params must be a JSON object".to_string()));
    }
    Ok(value)
}

/// Write output data to a file
pub async fn write_output_data(file_path: &str, content: &str) -> CliResult<()> {
    let path = Path::new(file_path);
    ensure_parent_dir(path)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}
