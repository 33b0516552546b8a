use crate::azure::{client::AzureDevOpsClient, work_items};
use crate::mcp::tools::support::{
    azure_error, deserialize_non_empty_string, deserialize_optional_non_blank, work_item_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

#[derive(Deserialize, JsonSchema)]
pub struct LinkWorkItemsArgs {
    /// Source work item ID
    pub source_id: u32,
    /// Target work item ID
    pub target_id: u32,
    /// What the target is to the source: "Parent", "Child", "Related", "Duplicate", "Dependency",
    /// or a link type reference name
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    pub link_type: String,
    /// Optional comment stored on the link
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub comment: Option<String>,
}

/// Maps friendly names to Azure DevOps link type reference names.
pub(crate) fn link_type_reference(link_type: &str) -> &str {
    match link_type.to_lowercase().as_str() {
        "parent" => "System.LinkTypes.Hierarchy-Reverse",
        "child" => "System.LinkTypes.Hierarchy-Forward",
        "related" => "System.LinkTypes.Related",
        "duplicate" => "System.LinkTypes.Duplicate-Forward",
        "dependency" => "System.LinkTypes.Dependency-Forward",
        _ => link_type,
    }
}

pub async fn link_work_items(
    client: &AzureDevOpsClient,
    args: LinkWorkItemsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_link_work_items(source_id={}, target_id={}, link_type={})",
        args.source_id,
        args.target_id,
        args.link_type
    );

    let work_item = work_items::link_work_items(
        client,
        args.source_id,
        args.target_id,
        link_type_reference(&args.link_type),
        args.comment.as_deref(),
    )
    .await
    .map_err(azure_error)?;

    work_item_result(&work_item)
}
