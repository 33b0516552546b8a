use crate::azure::{client::AzureDevOpsClient, git};
use crate::mcp::tools::support::{azure_error, internal_error, records_to_csv, text_result};
use rmcp::{ErrorData as McpError, model::CallToolResult};

pub async fn list_repositories(client: &AzureDevOpsClient) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_list_repositories");
    let repositories = git::list_repositories(client)
        .await
        .map_err(azure_error)?;

    if repositories.is_empty() {
        return Ok(text_result("No repositories found"));
    }

    let csv_data = records_to_csv(
        &["id", "name", "default_branch", "web_url"],
        repositories.into_iter().map(|r| {
            [
                r.id,
                r.name,
                r.default_branch
                    .as_deref()
                    .map(git::short_branch_name)
                    .unwrap_or_default()
                    .to_string(),
                r.web_url.unwrap_or_default(),
            ]
        }),
    )
    .map_err(internal_error)?;

    Ok(text_result(csv_data))
}
