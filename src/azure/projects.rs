use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::ListResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub last_update_time: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamMember {
    pub identity: TeamMemberIdentity,
    #[serde(rename = "isTeamAdmin", default)]
    pub is_team_admin: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamMemberIdentity {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "uniqueName", default)]
    pub unique_name: Option<String>,
    pub id: String,
}

/// List the projects of the organization (or collection).
pub async fn list_projects(
    client: &AzureDevOpsClient,
    top: Option<u32>,
    skip: Option<u32>,
) -> Result<Vec<Project>, AzureError> {
    client
        .operation("projects.list", async {
            let mut path = "projects?api-version=7.1".to_string();
            if let Some(top) = top {
                path.push_str(&format!("&$top={}", top));
            }
            if let Some(skip) = skip {
                path.push_str(&format!("&$skip={}", skip));
            }
            let response: ListResponse<Project> = client.org_get(&path).await?;
            Ok(response.value)
        })
        .await
}

/// Details of the configured project.
pub async fn get_project(client: &AzureDevOpsClient) -> Result<Project, AzureError> {
    client
        .operation("projects.get", async {
            let path = format!(
                "projects/{}?api-version=7.1",
                urlencoding::encode(client.project())
            );
            client.org_get(&path).await
        })
        .await
}

/// List all teams in the project
pub async fn list_teams(client: &AzureDevOpsClient) -> Result<Vec<Team>, AzureError> {
    client
        .operation("projects.list_teams", async {
            // Teams API: {base}/_apis/projects/{project}/teams
            let path = format!(
                "projects/{}/teams?api-version=7.1",
                urlencoding::encode(client.project())
            );
            let response: ListResponse<Team> = client.org_get(&path).await?;
            Ok(response.value)
        })
        .await
}

pub async fn list_team_members(
    client: &AzureDevOpsClient,
    team: &str,
) -> Result<Vec<TeamMember>, AzureError> {
    client
        .operation("projects.list_team_members", async {
            let path = format!(
                "projects/{}/teams/{}/members?api-version=7.1",
                urlencoding::encode(client.project()),
                urlencoding::encode(team)
            );
            let response: ListResponse<TeamMember> = client.org_get(&path).await?;
            Ok(response.value)
        })
        .await
}
