//! Connected account inspection

use crate::{
    cli::{AccountsCommand, OutputFormat},
    error::CliResult,
    utils::{entity_for, ColoredOutput},
};
use composio_client::ComposioClient;
use composio_core::{resolve_account, AppName, ConnectedAccount, ConnectedAccountId};
use tracing::debug;

pub struct AccountsCmd;

impl AccountsCmd {
    pub async fn run(client: &ComposioClient, command: AccountsCommand) -> CliResult<()> {
        match command {
            AccountsCommand::List {
                entity_id,
                app,
                all,
                format,
            } => {
                Self::list(client, entity_id.as_deref(), app.as_deref(), all, format).await
            }
            AccountsCommand::Resolve {
                app,
                entity_id,
                connected_account_id,
                format,
            } => {
                Self::resolve(
                    client,
                    &app,
                    entity_id.as_deref(),
                    connected_account_id.as_deref(),
                    format,
                )
                .await
            }
        }
    }

    async fn list(
        client: &ComposioClient,
        entity_id: Option<&str>,
        app: Option<&str>,
        all: bool,
        format: OutputFormat,
    ) -> CliResult<()> {
        let entity_id = entity_for(client, entity_id);
        let app = app.map(AppName::new);
        debug!(entity_id = %entity_id, app = ?app, all, "Listing connected accounts");

        let accounts = client.list_connected_accounts(&entity_id, app.as_ref(), !all).await?;

        match format {
            OutputFormat::Pretty => {
                if accounts.is_empty() {
                    println!(
                        "{}",
                        ColoredOutput::warning(&format!(
                            "No connected accounts for entity '{}'",
                            entity_id
                        ))
                    );
                    return Ok(());
                }
                println!(
                    "{:<28} {:<16} {:<10} {:<16} {}",
                    "ID", "APP", "STATUS", "ENTITY", "CREATED"
                );
                for account in &accounts {
                    println!("{}", Self::account_row(account));
                }
                println!("\nTotal: {} account(s)", accounts.len());
            }
            OutputFormat::Json => {
                println!("{}", format.format_json(&serde_json::to_value(&accounts)?)?);
            }
        }
        Ok(())
    }

    async fn resolve(
        client: &ComposioClient,
        app: &str,
        entity_id: Option<&str>,
        connected_account_id: Option<&str>,
        format: OutputFormat,
    ) -> CliResult<()> {
        let entity_id = entity_for(client, entity_id);
        let app = AppName::new(app);
        let explicit = connected_account_id.map(ConnectedAccountId::new);

        let account = resolve_account(client, &entity_id, explicit.as_ref(), &app).await?;

        match format {
            OutputFormat::Pretty => {
                println!(
                    "{} {}",
                    ColoredOutput::success("✓ Resolved connected account:"),
                    ColoredOutput::highlight(account.id.as_str())
                );
                println!("  App:     {}", account.app);
                println!("  Entity:  {}", account.entity_id);
                println!("  Status:  {}", account.status);
                println!("  Created: {}", account.created_at.to_rfc3339());
                if let Some(label) = &account.label {
                    println!("  Label:   {}", label);
                }
            }
            OutputFormat::Json => {
                println!("{}", format.format_json(&serde_json::to_value(&account)?)?);
            }
        }
        Ok(())
    }

    fn account_row(account: &ConnectedAccount) -> String {
        let status = format!("{:<10}", account.status.as_str());
        let status = if account.status.is_active() {
            ColoredOutput::success(&status)
        } else {
            ColoredOutput::dim(&status)
        };
        format!(
            "{:<28} {:<16} {} {:<16} {}",
            account.id.as_str(),
            account.app.as_str(),
            status,
            account.entity_id.as_str(),
            account.created_at.format("%Y-%m-%d %H:%M:%S")
        )
    }
}
