use crate::azure::{client::AzureDevOpsClient, git};
use crate::mcp::tools::support::{
    azure_error, deserialize_non_empty_string, deserialize_optional_non_blank, json_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

const DEFAULT_TOP: u32 = 20;

#[derive(Deserialize, JsonSchema)]
pub struct ListCommitsArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// Branch to list commits from (defaults to the repository's default branch)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub branch: Option<String>,
    /// Filter by author name or email
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub author: Option<String>,
    /// Only commits touching this path
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub item_path: Option<String>,
    /// Lower bound of the commit date (ISO 8601)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub from_date: Option<String>,
    /// Upper bound of the commit date (ISO 8601)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub to_date: Option<String>,
    /// Maximum number of commits to return (default 20)
    #[serde(default)]
    pub top: Option<u32>,
    /// Number of commits to skip
    #[serde(default)]
    pub skip: Option<u32>,
}

pub async fn list_commits(
    client: &AzureDevOpsClient,
    args: ListCommitsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_commits(repository={}, branch={:?})",
        args.repository,
        args.branch
    );
    let filter = git::CommitFilter {
        branch: args.branch,
        author: args.author,
        item_path: args.item_path,
        from_date: args.from_date,
        to_date: args.to_date,
        top: Some(args.top.unwrap_or(DEFAULT_TOP)),
        skip: args.skip,
    };
    let commits = git::list_commits(client, &args.repository, &filter)
        .await
        .map_err(azure_error)?;

    json_result(&commits)
}
