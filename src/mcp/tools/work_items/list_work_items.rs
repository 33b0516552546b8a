use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{azure_error, deserialize_optional_non_blank, work_items_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

const DEFAULT_TOP: usize = 50;

#[derive(Deserialize, JsonSchema)]
pub struct ListWorkItemsArgs {
    /// Work item type to include (e.g., "Bug", "User Story")
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub work_item_type: Option<String>,

    /// State to include (e.g., "Active")
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub state: Option<String>,

    /// Assignee (display name or email)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub assigned_to: Option<String>,

    /// Area path to filter by (e.g., "MyProject\\Team1"). Uses UNDER operator to include child paths.
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub area_path: Option<String>,

    /// Iteration path to filter by (e.g., "MyProject\\Sprint 1"). Uses UNDER operator to include child paths.
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub iteration_path: Option<String>,

    /// Number of matching work items to skip (default 0)
    #[serde(default)]
    pub skip: Option<usize>,

    /// Maximum number of work items to return (default 50)
    #[serde(default)]
    pub top: Option<usize>,
}

pub async fn list_work_items(
    client: &AzureDevOpsClient,
    args: ListWorkItemsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_work_items(type={:?}, state={:?}, skip={:?}, top={:?})",
        args.work_item_type,
        args.state,
        args.skip,
        args.top
    );

    let filter = work_items::WorkItemFilter {
        work_item_type: args.work_item_type,
        state: args.state,
        assigned_to: args.assigned_to,
        area_path: args.area_path,
        iteration_path: args.iteration_path,
    };
    let items = work_items::list_work_items(
        client,
        &filter,
        args.skip.unwrap_or(0),
        args.top.unwrap_or(DEFAULT_TOP),
    )
    .await
    .map_err(azure_error)?;

    work_items_result(&items)
}
