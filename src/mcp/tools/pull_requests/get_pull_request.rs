use crate::azure::{client::AzureDevOpsClient, pull_requests};
use crate::mcp::tools::support::{azure_error, deserialize_non_empty_string, json_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetPullRequestArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// Pull request ID
    pub pull_request_id: u32,
}

pub async fn get_pull_request(
    client: &AzureDevOpsClient,
    args: GetPullRequestArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_get_pull_request(repository={}, pull_request_id={})",
        args.repository,
        args.pull_request_id
    );
    let pull_request =
        pull_requests::get_pull_request(client, &args.repository, args.pull_request_id)
            .await
            .map_err(azure_error)?;
    json_result(&pull_request)
}
