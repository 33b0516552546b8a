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
pub struct AddPullRequestCommentArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// Pull request ID
    pub pull_request_id: u32,
    /// Comment text (markdown)
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub content: String,
    /// Reply in this existing thread instead of starting a new one
    #[serde(default)]
    pub thread_id: Option<u32>,
    /// Anchor a new thread to this file path
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub file_path: Option<String>,
}

pub async fn add_pull_request_comment(
    client: &AzureDevOpsClient,
    args: AddPullRequestCommentArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_add_pull_request_comment(repository={}, pull_request_id={}, thread_id={:?})",
        args.repository,
        args.pull_request_id,
        args.thread_id
    );
    let comment = pull_requests::add_pull_request_comment(
        client,
        &args.repository,
        args.pull_request_id,
        &args.content,
        args.thread_id,
        args.file_path.as_deref(),
    )
    .await
    .map_err(azure_error)?;
    json_result(&comment)
}
