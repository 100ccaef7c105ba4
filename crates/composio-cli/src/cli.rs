//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use std::path::PathBuf;

use crate::commands::ExecuteArgs;

#[derive(Parser)]
#[command(
    name = "composio",
    about = "Execute actions on connected apps and inspect connected accounts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Platform API key
    #[arg(long, env = "COMPOSIO_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Platform base URL
    #[arg(long, env = "COMPOSIO_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Client configuration file (YAML)
    #[arg(long, env = "COMPOSIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute an action
    Execute {
        #[command(flatten)]
        args: ExecuteArgs,
    },

    /// Inspect connected accounts
    Accounts {
        #[command(subcommand)]
        command: AccountsCommand,
    },

    /// Inspect action schemas
    Actions {
        #[command(subcommand)]
        command: ActionsCommand,
    },

    /// Print tool definitions for the given actions
    Tools {
        /// Action names (e.g., GITHUB_CREATE_AN_ISSUE)
        #[arg(required = true)]
        actions: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommand {
    /// List connected accounts of an entity
    List {
        /// Entity whose accounts to list
        #[arg(long, help = "Entity ID (defaults to 'default')")]
        entity_id: Option<String>,

        /// Filter by app
        #[arg(long)]
        app: Option<String>,

        /// Include accounts that are not active
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Show which connected account an execution would use
    Resolve {
        /// App the execution targets
        #[arg(long)]
        app: String,

        #[arg(long, help = "Entity ID (defaults to 'default')")]
        entity_id: Option<String>,

        /// Explicit connected account to check
        #[arg(long)]
        connected_account_id: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum ActionsCommand {
    /// Show one action's schema
    Show {
        action: String,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },

    /// List available actions
    List {
        /// Filter by app
        #[arg(long)]
        app: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    /// Human-readable output, pretty-printed JSON for payloads
    Pretty,
    /// Compact JSON
    Json,
}

impl OutputFormat {
    /// Format a JSON value according to the output format
    pub fn format_json(&self, value: &JsonValue) -> Result<String, serde_json::Error> {
        match self {
            Self::Pretty => serde_json::to_string_pretty(value),
            Self::Json => serde_json::to_string(value),
        }
    }
}
