use crate::azure::{client::AzureDevOpsClient, pull_requests};
use crate::mcp::tools::support::{
    azure_error, deserialize_non_empty_string, json_result, text_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListPullRequestCommentsArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// Pull request ID
    pub pull_request_id: u32,
}

pub async fn list_pull_request_comments(
    client: &AzureDevOpsClient,
    args: ListPullRequestCommentsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_pull_request_comments(repository={}, pull_request_id={})",
        args.repository,
        args.pull_request_id
    );
    let threads =
        pull_requests::list_pull_request_comments(client, &args.repository, args.pull_request_id)
            .await
            .map_err(azure_error)?;

    if threads.is_empty() {
        return Ok(text_result("No comments found"));
    }
    json_result(&threads)
}
