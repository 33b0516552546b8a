use crate::azure::{client::AzureDevOpsClient, projects};
use crate::mcp::tools::support::{azure_error, internal_error, records_to_csv, text_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListProjectsArgs {
    /// Maximum number of projects to return
    #[serde(default)]
    pub top: Option<u32>,
    /// Number of projects to skip
    #[serde(default)]
    pub skip: Option<u32>,
}

pub async fn list_projects(
    client: &AzureDevOpsClient,
    args: ListProjectsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_projects(top={:?}, skip={:?})",
        args.top,
        args.skip
    );
    let projects = projects::list_projects(client, args.top, args.skip)
        .await
        .map_err(azure_error)?;

    if projects.is_empty() {
        return Ok(text_result("No projects found"));
    }

    let csv_data = records_to_csv(
        &["id", "name", "state", "visibility", "description"],
        projects.into_iter().map(|p| {
            [
                p.id,
                p.name,
                p.state.unwrap_or_default(),
                p.visibility.unwrap_or_default(),
                p.description.unwrap_or_default(),
            ]
        }),
    )
    .map_err(internal_error)?;

    Ok(text_result(csv_data))
}
