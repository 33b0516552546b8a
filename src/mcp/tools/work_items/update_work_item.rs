use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{azure_error, invalid_params, work_item_result};
use crate::mcp::tools::work_items::fields::WorkItemFieldArgs;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};
use serde_json::json;

#[derive(Deserialize, JsonSchema)]
pub struct UpdateWorkItemArgs {
    /// Work item ID to update
    pub id: u32,

    /// Work item title
    #[serde(default)]
    pub title: Option<String>,

    #[serde(flatten)]
    pub fields: WorkItemFieldArgs,
}

pub async fn update_work_item(
    client: &AzureDevOpsClient,
    args: UpdateWorkItemArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_update_work_item(id={}, title={:?}, state={:?})",
        args.id,
        args.title,
        args.fields.state,
    );

    let mut fields = Vec::new();
    if let Some(title) = &args.title {
        fields.push(("System.Title".to_string(), json!(title)));
    }
    fields.extend(args.fields.to_field_list()?);
    if fields.is_empty() {
        return Err(invalid_params("No fields to update"));
    }

    let work_item = work_items::update_work_item(client, args.id, &fields)
        .await
        .map_err(azure_error)?;

    work_item_result(&work_item)
}
