use crate::azure::{boards, client::AzureDevOpsClient, projects};
use crate::mcp::tools::support::{
    azure_error, deserialize_optional_non_blank, internal_error, records_to_csv, text_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct ListTeamMembersArgs {
    /// Team ID or name (defaults to the project's default team)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub team: Option<String>,
}

pub async fn list_team_members(
    client: &AzureDevOpsClient,
    args: ListTeamMembersArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_list_team_members(team={:?})", args.team);
    let team = boards::team_or_default(client, args.team.as_deref());
    let members = projects::list_team_members(client, &team)
        .await
        .map_err(azure_error)?;

    let csv_data = records_to_csv(
        &["id", "display_name", "unique_name", "is_team_admin"],
        members.into_iter().map(|m| {
            [
                m.identity.id,
                m.identity.display_name,
                m.identity.unique_name.unwrap_or_default(),
                m.is_team_admin.unwrap_or(false).to_string(),
            ]
        }),
    )
    .map_err(internal_error)?;

    Ok(text_result(csv_data))
}
