use crate::azure::{boards, client::AzureDevOpsClient};
use crate::mcp::tools::support::{azure_error, deserialize_optional_non_blank, text_result};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct GetCurrentSprintArgs {
    /// Team ID or name (defaults to the project's default team)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub team: Option<String>,
}

pub async fn get_current_sprint(
    client: &AzureDevOpsClient,
    args: GetCurrentSprintArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_get_current_sprint(team={:?})", args.team);
    let sprint = boards::get_current_sprint(client, args.team.as_deref())
        .await
        .map_err(azure_error)?;

    Ok(text_result(super::sprints_to_csv(std::slice::from_ref(
        &sprint,
    ))?))
}
