use crate::azure::models::WorkItem;
use crate::mcp::tools::support::{
    internal_error, json_result, simplify_work_item_json, text_result,
};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde_json::Value;

// All possible columns in preferred order
const ALL_FIELDS: &[&str] = &[
    "id",
    "Type",
    "Title",
    "State",
    "Description",
    "Acceptance",
    "ReproSteps",
    "Column",
    "Lane",
    "Priority",
    "Severity",
    "AssignedTo",
    "CreatedBy",
    "CreatedDate",
    "ChangedBy",
    "ChangedDate",
    "AreaPath",
    "Iteration",
    "Project",
    "Tags",
    "StartDate",
    "TargetDate",
    "StoryPoints",
    "Effort",
    "RemainingWork",
    "Risk",
    "Justification",
    "ValueArea",
    "StackRank",
    "StateChangeDate",
    "History",
    "comments",
];

/// Converts work items JSON to CSV format with dynamic column detection.
/// Only includes columns that have at least one non-null value across all items.
pub fn work_items_to_csv(json_value: &Value) -> Result<String, String> {
    let items = match json_value {
        Value::Array(arr) => arr.as_slice(),
        Value::Object(_) => std::slice::from_ref(json_value),
        _ => return Err("Invalid input: expected object or array".to_string()),
    };

    if items.is_empty() {
        return Ok(String::new());
    }

    let active_fields: Vec<&str> = ALL_FIELDS
        .iter()
        .copied()
        .filter(|field| {
            items.iter().any(|item| {
                item.get(*field)
                    .map(|v| !v.is_null() && v.as_str().is_none_or(|s| !s.is_empty()))
                    .unwrap_or(false)
            })
        })
        .collect();

    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(&active_fields)
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    for item in items {
        let row: Vec<String> = active_fields
            .iter()
            .map(|field| {
                item.get(*field)
                    .and_then(|v| match v {
                        // Escape newlines and tabs for better LLM consumption
                        Value::String(s) => Some(
                            s.replace('\n', "\\n")
                                .replace('\t', "\\t")
                                .replace('\r', ""),
                        ),
                        Value::Number(n) => Some(n.to_string()),
                        Value::Bool(b) => Some(b.to_string()),
                        Value::Array(_) if *field == "comments" => serde_json::to_string(v).ok(),
                        _ => None,
                    })
                    .unwrap_or_default()
            })
            .collect();

        wtr.write_record(&row)
            .map_err(|e| format!("Failed to write CSV row: {}", e))?;
    }

    wtr.flush()
        .map_err(|e| format!("Failed to flush CSV writer: {}", e))?;

    let csv_bytes = wtr
        .into_inner()
        .map_err(|e| format!("Failed to get CSV bytes: {}", e))?;

    String::from_utf8(csv_bytes).map_err(|e| format!("Failed to convert CSV to string: {}", e))
}

/// Simplifies work items and renders them as the CSV tool output.
pub fn work_items_result(items: &[WorkItem]) -> Result<CallToolResult, McpError> {
    if items.is_empty() {
        return Ok(text_result("No work items found"));
    }

    let mut json_value = serde_json::to_value(items)
        .map_err(|e| internal_error(format!("Failed to serialize work items: {}", e)))?;
    simplify_work_item_json(&mut json_value);
    let csv_output = work_items_to_csv(&json_value)
        .map_err(|e| internal_error(format!("Failed to convert to CSV: {}", e)))?;

    Ok(text_result(csv_output))
}

/// A single work item, simplified, as JSON output.
pub fn work_item_result(item: &WorkItem) -> Result<CallToolResult, McpError> {
    let mut json_value = serde_json::to_value(item)
        .map_err(|e| internal_error(format!("Failed to serialize work item: {}", e)))?;
    simplify_work_item_json(&mut json_value);
    json_result(&json_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_populated_columns_are_emitted() {
        let items = json!([
            { "id": 1, "Title": "First", "State": "New", "Tags": "" },
            { "id": 2, "Title": "Second\nline", "State": null, "Priority": 2 }
        ]);
        let csv = work_items_to_csv(&items).unwrap();
        assert_eq!(
            csv,
            "id,Title,State,Priority\n1,First,New,\n2,Second\\nline,,2\n"
        );
    }

    #[test]
    fn comments_are_embedded_as_json() {
        let item = json!({ "id": 3, "comments": [{ "id": 1, "text": "ok" }] });
        let csv = work_items_to_csv(&item).unwrap();
        assert_eq!(
            csv,
            "id,comments\n3,\"[{\"\"id\"\":1,\"\"text\"\":\"\"ok\"\"}]\"\n"
        );
    }

    #[test]
    fn scalars_are_rejected() {
        assert!(work_items_to_csv(&json!("nope")).is_err());
    }

    #[test]
    fn empty_result_says_so() {
        let result = work_items_result(&[]).unwrap();
        assert_eq!(result.is_error, Some(false));
    }
}
