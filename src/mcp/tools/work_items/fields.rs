use crate::mcp::tools::support::invalid_params;
use rmcp::{
    ErrorData as McpError,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};
use serde_json::{Map, Value, json};

/// Optional work item fields shared by create and update.
#[derive(Deserialize, JsonSchema, Default)]
pub struct WorkItemFieldArgs {
    /// Work item description (Basic HTML supported)
    #[serde(default)]
    pub description: Option<String>,

    /// User to assign the work item to (email or display name)
    #[serde(default)]
    pub assigned_to: Option<String>,

    /// Area path (e.g., "MyProject\\Team1")
    #[serde(default)]
    pub area_path: Option<String>,

    /// Iteration path (e.g., "MyProject\\Sprint 1"), use azdo_get_current_sprint to get the current sprint
    #[serde(default)]
    pub iteration_path: Option<String>,

    /// State (New, Active, Resolved, Closed, etc.)
    #[serde(default)]
    pub state: Option<String>,

    /// Board column to place the work item in
    #[serde(default)]
    pub board_column: Option<String>,

    /// Board row/swimlane to place the work item in
    #[serde(default)]
    pub board_row: Option<String>,

    /// Priority (1-4, where 1 is highest)
    #[serde(default)]
    pub priority: Option<u32>,

    /// Severity for bugs (e.g., "2 - High")
    #[serde(default)]
    pub severity: Option<String>,

    /// Story points for estimation
    #[serde(default)]
    pub story_points: Option<f64>,

    /// Effort estimate in hours
    #[serde(default)]
    pub effort: Option<f64>,

    /// Remaining work in hours
    #[serde(default)]
    pub remaining_work: Option<f64>,

    /// Semicolon-separated tags (e.g., "ui; crash")
    #[serde(default)]
    pub tags: Option<String>,

    /// Activity type (Development, Testing, Documentation, etc.)
    #[serde(default)]
    pub activity: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,

    /// Target/due date (YYYY-MM-DD)
    #[serde(default)]
    pub target_date: Option<String>,

    /// Acceptance criteria
    #[serde(default)]
    pub acceptance_criteria: Option<String>,

    /// Reproduction steps
    #[serde(default)]
    pub repro_steps: Option<String>,

    /// Optional extra fields as a JSON object string, keyed by reference name (for custom fields)
    #[serde(default)]
    pub fields: Option<String>,
}

impl WorkItemFieldArgs {
    /// Reference name / value pairs for every field that was given.
    /// Extra `fields` entries override the named arguments.
    pub fn to_field_list(&self) -> Result<Vec<(String, Value)>, McpError> {
        let mut field_map = Map::new();

        let named: [(&str, Option<Value>); 18] = [
            ("System.Description", self.description.as_ref().map(|v| json!(v))),
            ("System.AssignedTo", self.assigned_to.as_ref().map(|v| json!(v))),
            ("System.AreaPath", self.area_path.as_ref().map(|v| json!(v))),
            ("System.IterationPath", self.iteration_path.as_ref().map(|v| json!(v))),
            ("System.State", self.state.as_ref().map(|v| json!(v))),
            ("System.BoardColumn", self.board_column.as_ref().map(|v| json!(v))),
            ("System.BoardLane", self.board_row.as_ref().map(|v| json!(v))),
            ("Microsoft.VSTS.Common.Priority", self.priority.map(|v| json!(v))),
            ("Microsoft.VSTS.Common.Severity", self.severity.as_ref().map(|v| json!(v))),
            ("Microsoft.VSTS.Scheduling.StoryPoints", self.story_points.map(|v| json!(v))),
            ("Microsoft.VSTS.Scheduling.Effort", self.effort.map(|v| json!(v))),
            ("Microsoft.VSTS.Scheduling.RemainingWork", self.remaining_work.map(|v| json!(v))),
            ("System.Tags", self.tags.as_ref().map(|v| json!(v))),
            ("Microsoft.VSTS.Common.Activity", self.activity.as_ref().map(|v| json!(v))),
            ("Microsoft.VSTS.Scheduling.StartDate", self.start_date.as_ref().map(|v| json!(v))),
            ("Microsoft.VSTS.Scheduling.TargetDate", self.target_date.as_ref().map(|v| json!(v))),
            (
                "Microsoft.VSTS.Common.AcceptanceCriteria",
                self.acceptance_criteria.as_ref().map(|v| json!(v)),
            ),
            ("Microsoft.VSTS.TCM.ReproSteps", self.repro_steps.as_ref().map(|v| json!(v))),
        ];
        for (name, value) in named {
            if let Some(value) = value {
                field_map.insert(name.to_string(), value);
            }
        }

        if let Some(extra) = &self.fields {
            let extra_json = serde_json::from_str::<Map<String, Value>>(extra)
                .map_err(|e| invalid_params(format!("Invalid JSON in extra fields: {}", e)))?;
            field_map.extend(extra_json);
        }

        Ok(field_map.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_given_fields_are_sent() {
        let args = WorkItemFieldArgs {
            state: Some("Active".into()),
            priority: Some(2),
            ..Default::default()
        };
        let fields = args.to_field_list().unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&("System.State".to_string(), json!("Active"))));
        assert!(fields.contains(&("Microsoft.VSTS.Common.Priority".to_string(), json!(2))));
    }

    #[test]
    fn extra_fields_override_named_ones() {
        let args = WorkItemFieldArgs {
            state: Some("Active".into()),
            fields: Some(r#"{"System.State": "Closed", "Custom.Team": "Web"}"#.into()),
            ..Default::default()
        };
        let fields = args.to_field_list().unwrap();
        assert!(fields.contains(&("System.State".to_string(), json!("Closed"))));
        assert!(fields.contains(&("Custom.Team".to_string(), json!("Web"))));
    }

    #[test]
    fn malformed_extra_fields_are_invalid_params() {
        let args = WorkItemFieldArgs {
            fields: Some("not json".into()),
            ..Default::default()
        };
        let err = args.to_field_list().unwrap_err();
        assert_eq!(err.code, rmcp::model::ErrorCode(-32602));
    }
}
