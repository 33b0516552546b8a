use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{azure_error, text_result, work_items_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetWorkItemsArgs {
    /// Work item IDs
    pub ids: Vec<u32>,
    /// Include the latest N comments of each work item (optional)
    #[serde(default)]
    pub include_latest_n_comments: Option<u32>,
}

pub async fn get_work_items(
    client: &AzureDevOpsClient,
    args: GetWorkItemsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_get_work_items(ids={:?})", args.ids);

    if args.ids.is_empty() {
        return Ok(text_result("No work items found"));
    }

    let items = work_items::get_work_items(client, &args.ids, args.include_latest_n_comments)
        .await
        .map_err(azure_error)?;

    work_items_result(&items)
}
