use crate::azure::{client::AzureDevOpsClient, projects};
use crate::mcp::tools::support::{azure_error, json_result};
use rmcp::{ErrorData as McpError, model::CallToolResult};

pub async fn get_project(client: &AzureDevOpsClient) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_get_project");
    let project = projects::get_project(client).await.map_err(azure_error)?;
    json_result(&project)
}
