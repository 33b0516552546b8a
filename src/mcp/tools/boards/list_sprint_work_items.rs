use crate::azure::{boards, client::AzureDevOpsClient};
use crate::mcp::tools::support::{azure_error, deserialize_optional_non_blank, work_items_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListSprintWorkItemsArgs {
    /// Team ID or name (defaults to the project's default team)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub team: Option<String>,
    /// Sprint (iteration) ID; defaults to the current sprint
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub sprint_id: Option<String>,
}

pub async fn list_sprint_work_items(
    client: &AzureDevOpsClient,
    args: ListSprintWorkItemsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_sprint_work_items(team={:?}, sprint_id={:?})",
        args.team,
        args.sprint_id
    );
    let items =
        boards::list_sprint_work_items(client, args.team.as_deref(), args.sprint_id.as_deref())
            .await
            .map_err(azure_error)?;

    work_items_result(&items)
}
