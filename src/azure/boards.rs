use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::{ListResponse, WorkItem};
use crate::azure::work_items;
use serde::{Deserialize, Serialize};

/// Summary information for a board (used in list operations)
#[derive(Debug, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BoardColumn {
    pub id: String,
    pub name: String,
    #[serde(rename = "itemLimit", default)]
    pub item_limit: i32,
    #[serde(rename = "stateMappings", default)]
    pub state_mappings: serde_json::Value,
    #[serde(rename = "columnType")]
    pub column_type: String,
    #[serde(default)]
    #[serde(rename = "isSplit")]
    pub is_split: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IterationAttributes {
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "finishDate", default)]
    pub finish_date: Option<String>,
    #[serde(rename = "timeFrame", default)]
    pub time_frame: Option<String>,
}

/// A sprint as configured in a team's settings.
#[derive(Debug, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub path: String,
    pub attributes: IterationAttributes,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IterationWorkItems {
    #[serde(rename = "workItemRelations", default)]
    work_item_relations: Vec<IterationWorkItemRelation>,
}

#[derive(Debug, Deserialize)]
struct IterationWorkItemRelation {
    target: IterationWorkItemTarget,
}

#[derive(Debug, Deserialize)]
struct IterationWorkItemTarget {
    id: u32,
}

/// Resolves the team a board or sprint call targets; Azure DevOps names a
/// project's default team `<project> Team`.
pub fn team_or_default(client: &AzureDevOpsClient, team: Option<&str>) -> String {
    match team {
        Some(team) if !team.trim().is_empty() => team.to_string(),
        _ => format!("{} Team", client.project()),
    }
}

/// List boards for a team
/// Note: In Azure DevOps, boards are team-specific Kanban boards
pub async fn list_boards(
    client: &AzureDevOpsClient,
    team: Option<&str>,
) -> Result<Vec<BoardSummary>, AzureError> {
    client
        .operation("boards.list", async {
            let team = team_or_default(client, team);
            let response: ListResponse<BoardSummary> = client
                .team_get(&team, "work/boards?api-version=7.1")
                .await?;
            Ok(response.value)
        })
        .await
}

/// List columns for a specific board
pub async fn list_board_columns(
    client: &AzureDevOpsClient,
    team: Option<&str>,
    board: &str,
) -> Result<Vec<BoardColumn>, AzureError> {
    client
        .operation("boards.list_columns", async {
            let team = team_or_default(client, team);
            let path = format!(
                "work/boards/{}/columns?api-version=7.1",
                urlencoding::encode(board)
            );
            let response: ListResponse<BoardColumn> = client.team_get(&team, &path).await?;
            Ok(response.value)
        })
        .await
}

/// All sprints of a team, or only those in `timeframe` (`past`, `current`, `future`).
pub async fn list_sprints(
    client: &AzureDevOpsClient,
    team: Option<&str>,
    timeframe: Option<&str>,
) -> Result<Vec<Sprint>, AzureError> {
    client
        .operation("boards.list_sprints", async {
            let team = team_or_default(client, team);
            let mut path = "work/teamsettings/iterations?api-version=7.1".to_string();
            if let Some(timeframe) = timeframe {
                path.push_str(&format!("&$timeframe={}", urlencoding::encode(timeframe)));
            }
            let response: ListResponse<Sprint> = client.team_get(&team, &path).await?;
            Ok(response.value)
        })
        .await
}

pub async fn get_current_sprint(
    client: &AzureDevOpsClient,
    team: Option<&str>,
) -> Result<Sprint, AzureError> {
    client
        .operation("boards.current_sprint", async {
            let team_name = team_or_default(client, team);
            let sprints = list_sprints(client, Some(&team_name), Some("current")).await?;
            // With $timeframe=current there should only be one
            sprints.into_iter().next().ok_or_else(|| {
                AzureError::NotFound(format!("Current sprint of team {}", team_name))
            })
        })
        .await
}

/// Work items planned in a sprint. `sprint_id` defaults to the current sprint.
pub async fn list_sprint_work_items(
    client: &AzureDevOpsClient,
    team: Option<&str>,
    sprint_id: Option<&str>,
) -> Result<Vec<WorkItem>, AzureError> {
    client
        .operation("boards.sprint_work_items", async {
            let team_name = team_or_default(client, team);
            let sprint_id = match sprint_id {
                Some(id) => id.to_string(),
                None => get_current_sprint(client, Some(&team_name)).await?.id,
            };
            let path = format!(
                "work/teamsettings/iterations/{}/workitems?api-version=7.1",
                urlencoding::encode(&sprint_id)
            );
            let response: IterationWorkItems = client.team_get(&team_name, &path).await?;

            let mut ids: Vec<u32> = Vec::new();
            for relation in response.work_item_relations {
                if !ids.contains(&relation.target.id) {
                    ids.push(relation.target.id);
                }
            }
            work_items::get_work_items(client, &ids, None).await
        })
        .await
}
