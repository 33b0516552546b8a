use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{azure_error, deserialize_non_empty_string, work_item_result};
use crate::mcp::tools::work_items::fields::WorkItemFieldArgs;
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};
use serde_json::json;

#[derive(Deserialize, JsonSchema)]
pub struct CreateWorkItemArgs {
    /// Type of work item (Bug, User Story, Task, Epic, Feature, etc.)
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub work_item_type: String,

    /// Work item title
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub title: String,

    /// ID of parent work item
    #[serde(default)]
    pub parent_id: Option<u32>,

    #[serde(flatten)]
    pub fields: WorkItemFieldArgs,
}

pub async fn create_work_item(
    client: &AzureDevOpsClient,
    args: CreateWorkItemArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_create_work_item(work_item_type={}, title={}, parent_id={:?})",
        args.work_item_type,
        args.title,
        args.parent_id,
    );

    let mut fields = vec![("System.Title".to_string(), json!(args.title))];
    fields.extend(args.fields.to_field_list()?);

    let work_item = work_items::create_work_item(client, &args.work_item_type, &fields)
        .await
        .map_err(azure_error)?;

    if let Some(parent_id) = args.parent_id {
        log::info!(
            "Creating parent-child link: child={}, parent={}",
            work_item.id,
            parent_id
        );
        work_items::link_work_items(
            client,
            work_item.id,
            parent_id,
            "System.LinkTypes.Hierarchy-Reverse",
            None,
        )
        .await
        .map_err(azure_error)?;
    }

    work_item_result(&work_item)
}
