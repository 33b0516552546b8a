// Work Items module
pub mod add_comment;
pub mod create_work_item;
pub mod fields;
pub mod get_work_item;
pub mod get_work_items;
pub mod link_work_items;
pub mod list_work_items;
pub mod query_work_items_by_wiql;
pub mod update_work_item;

// Re-export the public items
pub use add_comment::{AddCommentArgs, add_comment};
pub use create_work_item::{CreateWorkItemArgs, create_work_item};
pub use get_work_item::{GetWorkItemArgs, get_work_item};
pub use get_work_items::{GetWorkItemsArgs, get_work_items};
pub use link_work_items::{LinkWorkItemsArgs, link_work_items};
pub use list_work_items::{ListWorkItemsArgs, list_work_items};
pub use query_work_items_by_wiql::{QueryWorkItemsByWiqlArgs, query_work_items_by_wiql};
pub use update_work_item::{UpdateWorkItemArgs, update_work_item};
