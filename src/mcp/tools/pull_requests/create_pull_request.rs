use crate::azure::{client::AzureDevOpsClient, pull_requests};
use crate::mcp::tools::support::{
    azure_error, deserialize_non_empty_string, deserialize_optional_non_blank, json_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct CreatePullRequestArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// Branch with the changes (e.g., "feature/login")
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub source_branch: String,
    /// Branch to merge into (e.g., "main")
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub target_branch: String,
    /// Title of the pull request
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub title: String,
    /// Description (markdown)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub description: Option<String>,
    /// Identity IDs of the reviewers to add
    #[serde(default)]
    pub reviewer_ids: Vec<String>,
    /// Create the pull request as a draft
    #[serde(default)]
    pub is_draft: bool,
}

pub async fn create_pull_request(
    client: &AzureDevOpsClient,
    args: CreatePullRequestArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_create_pull_request(repository={}, source={}, target={})",
        args.repository,
        args.source_branch,
        args.target_branch
    );
    let new = pull_requests::NewPullRequest {
        source_branch: args.source_branch,
        target_branch: args.target_branch,
        title: args.title,
        description: args.description,
        reviewer_ids: args.reviewer_ids,
        is_draft: args.is_draft,
    };
    let pull_request = pull_requests::create_pull_request(client, &args.repository, &new)
        .await
        .map_err(azure_error)?;
    json_result(&pull_request)
}
