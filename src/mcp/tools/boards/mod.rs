// Boards and sprints module
pub mod get_current_sprint;
pub mod list_board_columns;
pub mod list_boards;
pub mod list_sprint_work_items;
pub mod list_sprints;

use crate::azure::boards::Sprint;
use crate::mcp::tools::support::{internal_error, records_to_csv};
use rmcp::ErrorData as McpError;

pub use get_current_sprint::{GetCurrentSprintArgs, get_current_sprint};
pub use list_board_columns::{ListBoardColumnsArgs, list_board_columns};
pub use list_boards::{ListBoardsArgs, list_boards};
pub use list_sprint_work_items::{ListSprintWorkItemsArgs, list_sprint_work_items};
pub use list_sprints::{ListSprintsArgs, list_sprints};

/// Columns: id, name, path, start_date, finish_date, time_frame
fn sprints_to_csv(sprints: &[Sprint]) -> Result<String, McpError> {
    records_to_csv(
        &["id", "name", "path", "start_date", "finish_date", "time_frame"],
        sprints.iter().map(|s| {
            [
                s.id.clone(),
                s.name.clone(),
                s.path.clone(),
                s.attributes.start_date.clone().unwrap_or_default(),
                s.attributes.finish_date.clone().unwrap_or_default(),
                s.attributes.time_frame.clone().unwrap_or_default(),
            ]
        }),
    )
    .map_err(internal_error)
}
