//! Tool definition export

use crate::error::{CliError, CliResult};
use composio_client::ComposioClient;
use composio_core::ActionName;
use composio_tools::{ToolDefinition, ToolSet};
use std::sync::Arc;

pub struct ToolsCommand;

impl ToolsCommand {
    pub async fn run(client: ComposioClient, actions: &[String]) -> CliResult<()> {
        let definitions = Self::definitions(client, actions).await?;
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        Ok(())
    }

    async fn definitions(
        client: ComposioClient,
        actions: &[String],
    ) -> CliResult<Vec<ToolDefinition>> {
        let names = actions
            .iter()
            .map(|a| ActionName::parse(a).map_err(|e| CliError::InvalidArgument(e.to_string())))
            .collect::<CliResult<Vec<_>>>()?;

        let toolset = ToolSet::from_client(Arc::new(client));
        let tools = toolset.get_tools(&names).await?;
        Ok(tools.iter().map(|t| t.definition()).collect())
    }
}
