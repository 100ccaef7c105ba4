//! Action schema inspection

use crate::{
    cli::{ActionsCommand, OutputFormat},
    error::{CliError, CliResult},
    utils::{truncate_text, ColoredOutput},
};
use composio_client::ComposioClient;
use composio_core::{ActionName, ActionSchema, AppName};

pub struct ActionsCmd;

impl ActionsCmd {
    pub async fn run(client: &ComposioClient, command: ActionsCommand) -> CliResult<()> {
        match command {
            ActionsCommand::Show { action, format } => Self::show(client, &action, format).await,
            ActionsCommand::List { app, format } => {
                Self::list(client, app.as_deref(), format).await
            }
        }
    }

    async fn show(client: &ComposioClient, action: &str, format: OutputFormat) -> CliResult<()> {
        let name =
            ActionName::parse(action).map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        let schema = client
            .get_action(&name)
            .await?
            .ok_or_else(|| CliError::ActionNotFound(name.to_string()))?;

        match format {
            OutputFormat::Pretty => {
                println!("{}", ColoredOutput::highlight(schema.name.as_str()));
                println!("App: {}", schema.app);
                if !schema.description.is_empty() {
                    println!("{}", schema.description);
                }
                let required = schema.required_params();
                if !required.is_empty() {
                    println!("Required: {}", required.join(", "));
                }
                println!("\n{}", ColoredOutput::highlight("Parameters:"));
                println!("{}", format.format_json(&schema.parameters)?);
            }
            OutputFormat::Json => {
                println!("{}", format.format_json(&serde_json::to_value(&schema)?)?);
            }
        }
        Ok(())
    }

    async fn list(
        client: &ComposioClient,
        app: Option<&str>,
        format: OutputFormat,
    ) -> CliResult<()> {
        let app = app.map(AppName::new);
        let schemas = client.list_actions(app.as_ref()).await?;

        match format {
            OutputFormat::Pretty => {
                for schema in &schemas {
                    println!("{}", Self::summary_line(schema));
                }
                println!("\nTotal: {} action(s)", schemas.len());
            }
            OutputFormat::Json => {
                println!("{}", format.format_json(&serde_json::to_value(&schemas)?)?);
            }
        }
        Ok(())
    }

    fn summary_line(schema: &ActionSchema) -> String {
        format!(
            "{:<48} {}",
            ColoredOutput::highlight(schema.name.as_str()),
            ColoredOutput::dim(&truncate_text(&schema.description, 72))
        )
    }
}
