use crate::azure::{client::AzureDevOpsClient, git};
use crate::mcp::tools::support::{
    azure_error, deserialize_non_empty_string, deserialize_optional_non_blank, internal_error,
    records_to_csv, text_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListBranchesArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
    /// Only branches whose name contains this text (case-insensitive)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub contains: Option<String>,
}

pub async fn list_branches(
    client: &AzureDevOpsClient,
    args: ListBranchesArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_branches(repository={}, contains={:?})",
        args.repository,
        args.contains
    );
    let branches = git::list_branches(client, &args.repository, args.contains.as_deref())
        .await
        .map_err(azure_error)?;

    if branches.is_empty() {
        return Ok(text_result("No branches found"));
    }

    let csv_data = records_to_csv(
        &["name", "object_id"],
        branches.into_iter().map(|b| [b.name, b.object_id]),
    )
    .map_err(internal_error)?;

    Ok(text_result(csv_data))
}
