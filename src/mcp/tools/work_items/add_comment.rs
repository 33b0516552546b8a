use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{azure_error, deserialize_non_empty_string, json_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct AddCommentArgs {
    /// Work item ID to add comment to
    pub work_item_id: u32,
    /// Comment text (supports markdown)
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub text: String,
}

pub async fn add_comment(
    client: &AzureDevOpsClient,
    args: AddCommentArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_add_work_item_comment(work_item_id={}, text_length={})",
        args.work_item_id,
        args.text.len()
    );

    let result = work_items::add_comment(client, args.work_item_id, &args.text)
        .await
        .map_err(azure_error)?;

    json_result(&result)
}
