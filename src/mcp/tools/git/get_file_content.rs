use crate::azure::{client::AzureDevOpsClient, git};
use crate::mcp::tools::support::{
    azure_error, deserialize_non_empty_string, deserialize_optional_non_blank, text_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetFileContentArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// Path of the file inside the repository (e.g., "/src/main.rs")
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub path: String,
    /// Branch to read from (defaults to the repository's default branch)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub branch: Option<String>,
}

pub async fn get_file_content(
    client: &AzureDevOpsClient,
    args: GetFileContentArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_get_file_content(repository={}, path={}, branch={:?})",
        args.repository,
        args.path,
        args.branch
    );
    let file = git::get_file_content(client, &args.repository, &args.path, args.branch.as_deref())
        .await
        .map_err(azure_error)?;

    if file.is_folder.unwrap_or(false) {
        return Ok(text_result(format!("{} is a folder", file.path)));
    }

    Ok(text_result(file.content.unwrap_or_default()))
}
