// Support module for shared utility functions
mod deserialize_non_empty_string;
mod errors;
mod records_to_csv;
mod simplify_work_item_json;
mod work_items_to_csv;

pub use deserialize_non_empty_string::{
    deserialize_non_empty_string, deserialize_optional_non_blank,
};
pub use errors::{azure_error, internal_error, invalid_params, json_result, text_result};
pub use records_to_csv::records_to_csv;
pub use simplify_work_item_json::simplify_work_item_json;
pub use work_items_to_csv::{work_item_result, work_items_result, work_items_to_csv};
