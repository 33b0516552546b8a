use crate::azure::{client::AzureDevOpsClient, git};
use crate::mcp::tools::support::{azure_error, deserialize_non_empty_string, json_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetRepositoryArgs {
    /// Repository ID or name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub repository: String,
}

pub async fn get_repository(
    client: &AzureDevOpsClient,
    args: GetRepositoryArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_get_repository(repository={})", args.repository);
    let repository = git::get_repository(client, &args.repository)
        .await
        .map_err(azure_error)?;
    json_result(&repository)
}
