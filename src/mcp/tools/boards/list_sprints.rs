use crate::azure::{boards, client::AzureDevOpsClient};
use crate::mcp::tools::support::{
    azure_error, deserialize_optional_non_blank, invalid_params, text_result,
};
use rmcp::{
    ErrorData as McpError,
    model::CallToolResult,
    schemars::{self, JsonSchema},
    serde::Deserialize,
};

const TIMEFRAMES: &[&str] = &["past", "current", "future"];

#[derive(Deserialize, JsonSchema)]
pub struct ListSprintsArgs {
    /// Team ID or name (defaults to the project's default team)
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub team: Option<String>,
    /// Only sprints in this timeframe: "past", "current" or "future"
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub timeframe: Option<String>,
}

pub async fn list_sprints(
    client: &AzureDevOpsClient,
    args: ListSprintsArgs,
) -> Result<CallToolResult, McpError> {
    log::info!(
        "Tool invoked: azdo_list_sprints(team={:?}, timeframe={:?})",
        args.team,
        args.timeframe
    );

    let timeframe = match args.timeframe.as_deref().map(str::to_lowercase) {
        Some(t) if TIMEFRAMES.contains(&t.as_str()) => Some(t),
        Some(t) => {
            return Err(invalid_params(format!(
                "Invalid timeframe '{}', expected one of: {}",
                t,
                TIMEFRAMES.join(", ")
            )));
        }
        None => None,
    };

    let sprints = boards::list_sprints(client, args.team.as_deref(), timeframe.as_deref())
        .await
        .map_err(azure_error)?;

    Ok(text_result(super::sprints_to_csv(&sprints)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::client::tests::cloud_client;
    use httpmock::prelude::*;
    use rmcp::model::{ErrorCode, RawContent};
    use serde_json::json;

    #[test]
    fn blank_timeframe_lists_every_sprint() {
        let args: ListSprintsArgs = serde_json::from_value(json!({ "timeframe": "" })).unwrap();
        assert_eq!(args.timeframe, None);
    }

    #[tokio::test]
    async fn unknown_timeframe_is_rejected_before_any_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path_contains("/_apis/");
            then.status(200).json_body(json!({ "value": [] }));
        });

        let client = cloud_client(&server);
        let args = ListSprintsArgs {
            team: None,
            timeframe: Some("someday".into()),
        };
        let err = list_sprints(&client, args).await.unwrap_err();

        assert_eq!(err.code, ErrorCode(-32602));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn sprints_are_rendered_as_csv() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path_contains("/_apis/work/teamsettings/iterations")
                .query_param("$timeframe", "current");
            then.status(200).json_body(json!({
                "value": [{
                    "id": "it-1",
                    "name": "Sprint 7",
                    "path": "Fabrikam\\Sprint 7",
                    "attributes": {
                        "startDate": "2026-10-05T00:00:00Z",
                        "finishDate": "2026-10-16T00:00:00Z",
                        "timeFrame": "current"
                    }
                }]
            }));
        });

        let client = cloud_client(&server);
        let args = ListSprintsArgs {
            team: Some("Web".into()),
            timeframe: Some("Current".into()),
        };
        let result = list_sprints(&client, args).await.unwrap();

        let RawContent::Text(text) = &result.content[0].raw else {
            panic!("expected text content");
        };
        assert_eq!(
            text.text,
            "id,name,path,start_date,finish_date,time_frame\n\
             it-1,Sprint 7,Fabrikam\\Sprint 7,2026-10-05T00:00:00Z,2026-10-16T00:00:00Z,current\n"
        );
    }
}
