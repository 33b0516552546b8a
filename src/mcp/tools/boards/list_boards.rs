use crate::azure::{boards, client::AzureDevOpsClient};
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
pub struct ListBoardsArgs {
    /// Team ID or name (defaults to the project's default team)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub team: Option<String>,
}

pub async fn list_boards(
    client: &AzureDevOpsClient,
    args: ListBoardsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!("Tool invoked: azdo_list_boards(team={:?})", args.team);
    let boards = boards::list_boards(client, args.team.as_deref())
        .await
        .map_err(azure_error)?;

    let csv_data = records_to_csv(
        &["id", "name"],
        boards.into_iter().map(|b| [b.id, b.name]),
    )
    .map_err(internal_error)?;

    Ok(text_result(csv_data))
}
