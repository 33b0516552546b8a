use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::ListResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub is_disabled: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub object_id: String,
    #[serde(default)]
    pub creator: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub path: String,
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_folder: Option<bool>,
}

/// Filters for [`list_commits`].
#[derive(Debug, Default)]
pub struct CommitFilter {
    pub branch: Option<String>,
    pub author: Option<String>,
    pub item_path: Option<String>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
}

/// Prepends `refs/heads/` unless the name is already a full ref.
pub fn full_branch_ref(branch: &str) -> String {
    if branch.starts_with("refs/") {
        branch.to_string()
    } else {
        format!("refs/heads/{}", branch)
    }
}

pub fn short_branch_name(reference: &str) -> &str {
    reference.strip_prefix("refs/heads/").unwrap_or(reference)
}

pub async fn list_repositories(client: &AzureDevOpsClient) -> Result<Vec<Repository>, AzureError> {
    client
        .operation("git.list_repositories", async {
            let response: ListResponse<Repository> =
                client.get("git/repositories?api-version=7.1").await?;
            Ok(response.value)
        })
        .await
}

/// Looks a repository up by id or name.
pub async fn get_repository(
    client: &AzureDevOpsClient,
    repository: &str,
) -> Result<Repository, AzureError> {
    client
        .operation("git.get_repository", async {
            let path = format!(
                "git/repositories/{}?api-version=7.1",
                urlencoding::encode(repository)
            );
            client.get(&path).await
        })
        .await
}

/// Branches of a repository; `contains` keeps only those whose name contains
/// the given text (case-insensitive).
pub async fn list_branches(
    client: &AzureDevOpsClient,
    repository: &str,
    contains: Option<&str>,
) -> Result<Vec<Branch>, AzureError> {
    client
        .operation("git.list_branches", async {
            let path = format!(
                "git/repositories/{}/refs?filter=heads/&api-version=7.1",
                urlencoding::encode(repository)
            );
            let response: ListResponse<Branch> = client.get(&path).await?;

            let needle = contains.map(str::to_lowercase);
            Ok(response
                .value
                .into_iter()
                .map(|mut branch| {
                    branch.name = short_branch_name(&branch.name).to_string();
                    branch
                })
                .filter(|branch| match &needle {
                    Some(needle) => branch.name.to_lowercase().contains(needle),
                    None => true,
                })
                .collect())
        })
        .await
}

/// Content of one file, at `branch` when given or the default branch otherwise.
pub async fn get_file_content(
    client: &AzureDevOpsClient,
    repository: &str,
    path: &str,
    branch: Option<&str>,
) -> Result<FileContent, AzureError> {
    client
        .operation("git.get_file_content", async {
            let mut url = format!(
                "git/repositories/{}/items?path={}&includeContent=true&api-version=7.1",
                urlencoding::encode(repository),
                urlencoding::encode(path)
            );
            if let Some(branch) = branch {
                url.push_str(&format!(
                    "&versionDescriptor.version={}&versionDescriptor.versionType=branch",
                    urlencoding::encode(short_branch_name(branch))
                ));
            }
            client.get(&url).await
        })
        .await
}

pub async fn list_commits(
    client: &AzureDevOpsClient,
    repository: &str,
    filter: &CommitFilter,
) -> Result<Vec<Value>, AzureError> {
    client
        .operation("git.list_commits", async {
            let mut path = format!(
                "git/repositories/{}/commits?api-version=7.1",
                urlencoding::encode(repository)
            );
            if let Some(branch) = &filter.branch {
                path.push_str(&format!(
                    "&searchCriteria.itemVersion.version={}&searchCriteria.itemVersion.versionType=branch",
                    urlencoding::encode(short_branch_name(branch))
                ));
            }
            let criteria = [
                ("author", &filter.author),
                ("itemPath", &filter.item_path),
                ("fromDate", &filter.from_date),
                ("toDate", &filter.to_date),
            ];
            for (name, value) in criteria {
                if let Some(value) = value {
                    path.push_str(&format!(
                        "&searchCriteria.{}={}",
                        name,
                        urlencoding::encode(value)
                    ));
                }
            }
            if let Some(top) = filter.top {
                path.push_str(&format!("&searchCriteria.$top={}", top));
            }
            if let Some(skip) = filter.skip {
                path.push_str(&format!("&searchCriteria.$skip={}", skip));
            }

            let response: ListResponse<Value> = client.get(&path).await?;
            Ok(response.value)
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::client::tests::cloud_client;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn branch_refs() {
        assert_eq!(full_branch_ref("main"), "refs/heads/main");
        assert_eq!(full_branch_ref("refs/heads/main"), "refs/heads/main");
        assert_eq!(short_branch_name("refs/heads/feature/x"), "feature/x");
        assert_eq!(short_branch_name("main"), "main");
    }

    #[tokio::test]
    async fn branches_are_shortened_and_filtered() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/contoso/Fabrikam/_apis/git/repositories/web/refs")
                .query_param("filter", "heads/");
            then.status(200).json_body(json!({
                "value": [
                    { "name": "refs/heads/main", "objectId": "a1" },
                    { "name": "refs/heads/feature/Login", "objectId": "b2" },
                    { "name": "refs/heads/bugfix/crash", "objectId": "c3" }
                ]
            }));
        });

        let client = cloud_client(&server);
        let branches = list_branches(&client, "web", Some("login")).await.unwrap();

        mock.assert();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].name, "feature/Login");
    }

    #[tokio::test]
    async fn file_content_at_branch() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/contoso/Fabrikam/_apis/git/repositories/web/items")
                .query_param("path", "/src/main.rs")
                .query_param("includeContent", "true")
                .query_param("versionDescriptor.version", "develop");
            then.status(200).json_body(json!({
                "path": "/src/main.rs",
                "objectId": "f00",
                "content": "fn main() {}"
            }));
        });

        let client = cloud_client(&server);
        let file = get_file_content(&client, "web", "/src/main.rs", Some("refs/heads/develop"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(file.content.as_deref(), Some("fn main() {}"));
    }

    #[tokio::test]
    async fn commits_use_search_criteria() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/contoso/Fabrikam/_apis/git/repositories/web/commits")
                .query_param("searchCriteria.author", "Jane")
                .query_param("searchCriteria.$top", "3");
            then.status(200).json_body(json!({
                "count": 1,
                "value": [{ "commitId": "abc", "comment": "Fix crash" }]
            }));
        });

        let client = cloud_client(&server);
        let filter = CommitFilter {
            author: Some("Jane".into()),
            top: Some(3),
            ..Default::default()
        };
        let commits = list_commits(&client, "web", &filter).await.unwrap();

        mock.assert();
        assert_eq!(commits[0]["commitId"], "abc");
    }

    #[tokio::test]
    async fn unknown_repository_surfaces_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/contoso/Fabrikam/_apis/git/repositories/missing");
            then.status(404).body("TF401019");
        });

        let client = cloud_client(&server);
        let err = get_repository(&client, "missing").await.unwrap_err();
        assert!(matches!(err, AzureError::ApiError { status: 404, .. }));
    }
}
