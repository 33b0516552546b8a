use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{azure_error, deserialize_non_empty_string, work_items_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct QueryWorkItemsByWiqlArgs {
    /// WIQL query string (e.g., "SELECT [System.Id] FROM WorkItems WHERE [System.State] = 'Active'")
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub query: String,
    /// Include the latest N comments of each work item (optional)
    #[serde(default)]
    pub include_latest_n_comments: Option<u32>,
}

pub async fn query_work_items_by_wiql(
    client: &AzureDevOpsClient,
    args: QueryWorkItemsByWiqlArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_query_work_items_by_wiql(query={})",
        args.query
    );
    let items = work_items::query_work_items(client, &args.query, args.include_latest_n_comments)
        .await
        .map_err(azure_error)?;

    work_items_result(&items)
}
