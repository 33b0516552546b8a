use crate::azure::{client::AzureDevOpsClient, pull_requests};
use crate::mcp::tools::support::{
    azure_error, deserialize_non_empty_string, deserialize_optional_non_blank, json_result,
    text_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListPullRequestsArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// "active", "abandoned", "completed" or "all" (default "active")
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub status: Option<String>,
    /// Source branch name (e.g., "feature/login")
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub source_branch: Option<String>,
    /// Target branch name (e.g., "main")
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub target_branch: Option<String>,
    /// Maximum number of pull requests to return
    #[serde(default)]
    pub top: Option<u32>,
    /// Number of pull requests to skip
    #[serde(default)]
    pub skip: Option<u32>,
}

pub async fn list_pull_requests(
    client: &AzureDevOpsClient,
    args: ListPullRequestsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_pull_requests(repository={}, status={:?})",
        args.repository,
        args.status
    );
    let search = pull_requests::PullRequestSearch {
        status: args.status,
        source_branch: args.source_branch,
        target_branch: args.target_branch,
        top: args.top,
        skip: args.skip,
    };
    let pull_requests = pull_requests::list_pull_requests(client, &args.repository, &search)
        .await
        .map_err(azure_error)?;

    if pull_requests.is_empty() {
        return Ok(text_result("No pull requests found"));
    }
    json_result(&pull_requests)
}
