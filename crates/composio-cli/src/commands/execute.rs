//! Action execution command

use crate::{
    cli::OutputFormat,
    error::{CliError, CliResult},
    utils::{entity_or, read_params, write_output_data, ColoredOutput},
};
use clap::Args;
use composio_client::ComposioClient;
use composio_core::{sanitize_json_value, ActionName, ExecuteRequest, ExecuteResponse};
use tracing::{debug, info};

#[derive(Args, Debug, Clone)]
pub struct ExecuteArgs {
    /// Action to execute
    #[arg(help = "Action name (e.g., GITHUB_CREATE_AN_ISSUE)")]
    pub action: String,

    /// Params as JSON string
    #[arg(short, long, help = "Action params as JSON string")]
    pub params: Option<String>,

    /// Params from file
    #[arg(
        long,
        conflicts_with = "params",
        help = "Read action params from file (JSON or YAML)"
    )]
    pub params_file: Option<String>,

    /// Entity to execute as
    #[arg(long, help = "Entity ID (defaults to 'default')")]
    pub entity_id: Option<String>,

    /// Connected account to execute with
    #[arg(long, help = "Use this connected account instead of the most recent active one")]
    pub connected_account_id: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty", help = "Output format")]
    pub format: OutputFormat,

    /// Save output to file
    #[arg(long, help = "Save output to file")]
    pub output: Option<String>,
}

pub struct ExecuteCommand;

impl ExecuteCommand {
    /// Execute and print the response. An unsuccessful response is returned
    /// as [`CliError::ExecutionFailed`] after it has been printed.
    pub async fn run(client: &ComposioClient, args: ExecuteArgs) -> CliResult<()> {
        let default_entity = client.config().default_entity_id.as_deref();
        let request = Self::build_request(&args, default_entity).await?;

        info!(action = %request.action, "Executing action");
        debug!(params = %sanitize_json_value(&request.params), "Action params");

        let start_time = std::time::Instant::now();
        let response = client.execute_action(&request).await?;
        let total_duration = start_time.elapsed();
        debug!(duration_ms = total_duration.as_millis() as u64, "Execution finished");

        Self::display_response(&response, args.format, args.output.as_deref()).await?;

        response
            .into_result()
            .map(|_| ())
            .map_err(CliError::ExecutionFailed)
    }

    /// Request for `args`; without `--entity-id` it runs as `default_entity`
    async fn build_request(
        args: &ExecuteArgs,
        default_entity: Option<&str>,
    ) -> CliResult<ExecuteRequest> {
        let action = ActionName::parse(&args.action)
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        let params = read_params(args.params.clone(), args.params_file.clone()).await?;

        let entity_id = entity_or(args.entity_id.as_deref(), default_entity);
        let mut request = ExecuteRequest::new(action)
            .with_params(params)
            .with_entity_id(entity_id.to_string());
        if let Some(id) = args.connected_account_id.as_deref() {
            request = request.with_connected_account_id(id);
        }
        Ok(request)
    }

    async fn display_response(
        response: &ExecuteResponse,
        format: OutputFormat,
        output_file: Option<&str>,
    ) -> CliResult<()> {
        let formatted_output = format.format_json(&serde_json::to_value(response)?)?;

        if let Some(output_path) = output_file {
            write_output_data(output_path, &formatted_output).await?;
            println!(
                "{}",
                ColoredOutput::success(&format!("✓ Output saved to: {}", output_path))
            );
        } else {
            println!("{}", formatted_output);
        }

        if format == OutputFormat::Pretty && output_file.is_none() && response.is_successful() {
            println!("\n{}", ColoredOutput::success("✓ Action executed successfully"));
        }
        Ok(())
    }
}
