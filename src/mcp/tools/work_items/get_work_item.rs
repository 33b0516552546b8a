use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{azure_error, work_items_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetWorkItemArgs {
    /// Work item ID
    pub id: u32,
    /// Include the latest N comments (optional)
    #[serde(default)]
    pub include_latest_n_comments: Option<u32>,
}

pub async fn get_work_item(
    client: &AzureDevOpsClient,
    args: GetWorkItemArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_get_work_item(id={})", args.id);
    let work_item = work_items::get_work_item(client, args.id, args.include_latest_n_comments)
        .await
        .map_err(azure_error)?;

    work_items_result(std::slice::from_ref(&work_item))
}
