use crate::azure::{boards, client::AzureDevOpsClient};
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
pub struct ListBoardColumnsArgs {
    /// Team ID or name (defaults to the project's default team)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub team: Option<String>,
    /// Board ID or name (e.g., "Stories")
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub board: String,
}

pub async fn list_board_columns(
    client: &AzureDevOpsClient,
    args: ListBoardColumnsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_board_columns(team={:?}, board={})",
        args.team,
        args.board
    );
    let columns = boards::list_board_columns(client, args.team.as_deref(), &args.board)
        .await
        .map_err(azure_error)?;

    // item_limit is the WIP limit
    let csv_data = records_to_csv(
        &["name", "item_limit", "is_split", "column_type"],
        columns.into_iter().map(|c| {
            [
                c.name,
                c.item_limit.to_string(),
                c.is_split.unwrap_or(false).to_string(),
                c.column_type,
            ]
        }),
    )
    .map_err(internal_error)?;

    Ok(text_result(csv_data))
}
