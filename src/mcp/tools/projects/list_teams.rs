use crate::azure::{client::AzureDevOpsClient, projects};
use crate::mcp::tools::support::{azure_error, internal_error, records_to_csv, text_result};
use rmcp::{ErrorData as McpError, model::CallToolResult};

pub async fn list_teams(client: &AzureDevOpsClient) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_list_teams");
    let teams = projects::list_teams(client).await.map_err(azure_error)?;

    let csv_data = records_to_csv(
        &["id", "name", "description"],
        teams
            .into_iter()
            .map(|t| [t.id, t.name, t.description.unwrap_or_default()]),
    )
    .map_err(internal_error)?;

    Ok(text_result(csv_data))
}
