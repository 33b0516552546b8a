//! Pull request operations.
//!
//! Every operation addressed by `(repository, pull_request_id)` first loads the
//! pull request and checks it belongs to that repository, so a mutation can
//! never land on a pull request of another repository with the same id.

use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::enums::{self, MERGE_STRATEGY, PULL_REQUEST_STATUS, REVIEWER_VOTE};
use crate::azure::git::full_branch_ref;
use crate::azure::models::{ConnectionData, ListResponse};
use serde_json::{Value, json};

const APPROVE_VOTE: i64 = 10;
const COMMENT_TYPE_TEXT: u8 = 1;
const THREAD_STATUS_ACTIVE: u8 = 1;
const MISSING_REPOSITORY: &str = "<missing>";

#[derive(Debug, Default)]
pub struct PullRequestSearch {
    pub status: Option<String>,
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
    pub top: Option<u32>,
    pub skip: Option<u32>,
}

#[derive(Debug)]
pub struct NewPullRequest {
    pub source_branch: String,
    pub target_branch: String,
    pub title: String,
    pub description: Option<String>,
    pub reviewer_ids: Vec<String>,
    pub is_draft: bool,
}

/// How a pull request is merged.
#[derive(Debug, Default)]
pub struct CompletionOptions {
    pub merge_strategy: Option<String>,
    pub delete_source_branch: bool,
    pub merge_commit_message: Option<String>,
}

impl CompletionOptions {
    fn to_json(&self) -> Result<Value, AzureError> {
        let mut options = json!({ "deleteSourceBranch": self.delete_source_branch });
        if let Some(strategy) = &self.merge_strategy {
            let code = MERGE_STRATEGY.code_of(strategy).ok_or_else(|| {
                AzureError::InvalidArgument(format!(
                    "unknown merge strategy '{}', expected one of: {}",
                    strategy,
                    MERGE_STRATEGY.names().collect::<Vec<_>>().join(", ")
                ))
            })?;
            options["mergeStrategy"] = Value::String(MERGE_STRATEGY.name_of(code));
        }
        if let Some(message) = &self.merge_commit_message {
            options["mergeCommitMessage"] = Value::String(message.clone());
        }
        Ok(options)
    }
}

fn validate_status(status: &str) -> Result<String, AzureError> {
    if status.eq_ignore_ascii_case("all") {
        return Ok("all".to_string());
    }
    PULL_REQUEST_STATUS
        .code_of(status)
        .map(|code| PULL_REQUEST_STATUS.name_of(code))
        .ok_or_else(|| {
            AzureError::InvalidArgument(format!(
                "unknown pull request status '{}', expected one of: {}, all",
                status,
                PULL_REQUEST_STATUS.names().collect::<Vec<_>>().join(", ")
            ))
        })
}

/// Name (or id) of the repository a pull request belongs to when it is not
/// `repository`. A pull request without repository id and name never matches.
fn repository_mismatch(pull_request: &Value, repository: &str) -> Option<String> {
    let repo = pull_request.get("repository");
    let field = |key: &str| {
        repo.and_then(|r| r.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
    };
    let (id, name) = (field("id"), field("name"));
    if id.is_empty() && name.is_empty() {
        Some(MISSING_REPOSITORY.to_string())
    } else if id.eq_ignore_ascii_case(repository) || name.eq_ignore_ascii_case(repository) {
        None
    } else if name.is_empty() {
        Some(id.to_string())
    } else {
        Some(name.to_string())
    }
}

fn pull_request_path(repository: &str, pull_request_id: u32, rest: &str) -> String {
    format!(
        "git/repositories/{}/pullrequests/{}{}",
        urlencoding::encode(repository),
        pull_request_id,
        rest
    )
}

/// Loads a pull request and fails with [`AzureError::RepositoryMismatch`] when
/// it does not belong to `repository` (matched by id or name).
pub async fn get_pull_request_checked(
    client: &AzureDevOpsClient,
    repository: &str,
    pull_request_id: u32,
) -> Result<Value, AzureError> {
    let path = format!("git/pullrequests/{}?api-version=7.1", pull_request_id);
    let pull_request: Value = client.get(&path).await?;

    match repository_mismatch(&pull_request, repository) {
        None => Ok(pull_request),
        Some(actual) => {
            log::warn!(
                "Pull request {} requested for repository {} belongs to {}",
                pull_request_id,
                repository,
                actual
            );
            Err(AzureError::RepositoryMismatch {
                pull_request_id,
                expected: repository.to_string(),
                actual,
            })
        }
    }
}

async fn current_user_id(client: &AzureDevOpsClient) -> Result<String, AzureError> {
    let data: ConnectionData = client.org_get("connectionData").await?;
    Ok(data.authenticated_user.id)
}

pub async fn list_pull_requests(
    client: &AzureDevOpsClient,
    repository: &str,
    search: &PullRequestSearch,
) -> Result<Vec<Value>, AzureError> {
    client
        .operation("pull_requests.list", async {
            let mut path = format!(
                "git/repositories/{}/pullrequests?api-version=7.1",
                urlencoding::encode(repository)
            );

            if let Some(status) = &search.status {
                let status = validate_status(status)?;
                path.push_str(&format!("&searchCriteria.status={}", status));
            }
            if let Some(source) = &search.source_branch {
                path.push_str(&format!(
                    "&searchCriteria.sourceRefName={}",
                    urlencoding::encode(&full_branch_ref(source))
                ));
            }
            if let Some(target) = &search.target_branch {
                path.push_str(&format!(
                    "&searchCriteria.targetRefName={}",
                    urlencoding::encode(&full_branch_ref(target))
                ));
            }
            if let Some(top) = search.top {
                path.push_str(&format!("&$top={}", top));
            }
            if let Some(skip) = search.skip {
                path.push_str(&format!("&$skip={}", skip));
            }

            let mut response: ListResponse<Value> = client.get(&path).await?;
            response.value.iter_mut().for_each(enums::normalize_pull_request);
            Ok(response.value)
        })
        .await
}

pub async fn get_pull_request(
    client: &AzureDevOpsClient,
    repository: &str,
    pull_request_id: u32,
) -> Result<Value, AzureError> {
    client
        .operation("pull_requests.get", async {
            let mut pull_request =
                get_pull_request_checked(client, repository, pull_request_id).await?;
            enums::normalize_pull_request(&mut pull_request);
            Ok(pull_request)
        })
        .await
}

pub async fn create_pull_request(
    client: &AzureDevOpsClient,
    repository: &str,
    new: &NewPullRequest,
) -> Result<Value, AzureError> {
    client
        .operation("pull_requests.create", async {
            let mut body = json!({
                "sourceRefName": full_branch_ref(&new.source_branch),
                "targetRefName": full_branch_ref(&new.target_branch),
                "title": new.title,
                "isDraft": new.is_draft,
            });
            if let Some(description) = &new.description {
                body["description"] = Value::String(description.clone());
            }
            if !new.reviewer_ids.is_empty() {
                body["reviewers"] = new
                    .reviewer_ids
                    .iter()
                    .map(|id| json!({ "id": id }))
                    .collect();
            }

            let path = format!(
                "git/repositories/{}/pullrequests?api-version=7.1",
                urlencoding::encode(repository)
            );
            let mut created: Value = client.post(&path, &body).await?;
            enums::normalize_pull_request(&mut created);
            Ok(created)
        })
        .await
}

/// Comment threads of a pull request, without deleted threads.
pub async fn list_pull_request_comments(
    client: &AzureDevOpsClient,
    repository: &str,
    pull_request_id: u32,
) -> Result<Vec<Value>, AzureError> {
    client
        .operation("pull_requests.list_comments", async {
            get_pull_request_checked(client, repository, pull_request_id).await?;

            let path = pull_request_path(repository, pull_request_id, "/threads?api-version=7.1");
            let response: ListResponse<Value> = client.get(&path).await?;
            Ok(response
                .value
                .into_iter()
                .filter(|thread| !thread["isDeleted"].as_bool().unwrap_or(false))
                .collect())
        })
        .await
}

/// Starts a new thread, or replies to `thread_id` when given. A new thread
/// may be anchored to `file_path`.
pub async fn add_pull_request_comment(
    client: &AzureDevOpsClient,
    repository: &str,
    pull_request_id: u32,
    content: &str,
    thread_id: Option<u32>,
    file_path: Option<&str>,
) -> Result<Value, AzureError> {
    client
        .operation("pull_requests.add_comment", async {
            get_pull_request_checked(client, repository, pull_request_id).await?;

            match thread_id {
                Some(thread_id) => {
                    let path = pull_request_path(
                        repository,
                        pull_request_id,
                        &format!("/threads/{}/comments?api-version=7.1", thread_id),
                    );
                    let body = json!({
                        "content": content,
                        "parentCommentId": 1,
                        "commentType": COMMENT_TYPE_TEXT,
                    });
                    client.post(&path, &body).await
                }
                None => {
                    let path =
                        pull_request_path(repository, pull_request_id, "/threads?api-version=7.1");
                    let mut body = json!({
                        "comments": [{
                            "parentCommentId": 0,
                            "content": content,
                            "commentType": COMMENT_TYPE_TEXT,
                        }],
                        "status": THREAD_STATUS_ACTIVE,
                    });
                    if let Some(file_path) = file_path {
                        body["threadContext"] = json!({ "filePath": file_path });
                    }
                    client.post(&path, &body).await
                }
            }
        })
        .await
}

/// Records an `approved` vote for the authenticated user.
pub async fn approve_pull_request(
    client: &AzureDevOpsClient,
    repository: &str,
    pull_request_id: u32,
) -> Result<Value, AzureError> {
    client
        .operation("pull_requests.approve", async {
            get_pull_request_checked(client, repository, pull_request_id).await?;
            let user_id = current_user_id(client).await?;

            let path = pull_request_path(
                repository,
                pull_request_id,
                &format!(
                    "/reviewers/{}?api-version=7.1",
                    urlencoding::encode(&user_id)
                ),
            );
            let mut reviewer: Value = client.put(&path, &json!({ "vote": APPROVE_VOTE })).await?;
            if let Some(vote) = reviewer.get_mut("vote") {
                REVIEWER_VOTE.normalize(vote);
            }
            Ok(reviewer)
        })
        .await
}

/// Completes an active pull request now.
pub async fn merge_pull_request(
    client: &AzureDevOpsClient,
    repository: &str,
    pull_request_id: u32,
    options: &CompletionOptions,
) -> Result<Value, AzureError> {
    client
        .operation("pull_requests.merge", async {
            let completion_options = options.to_json()?;
            let pull_request =
                get_pull_request_checked(client, repository, pull_request_id).await?;

            let status = pull_request.get("status").cloned().unwrap_or(Value::Null);
            let is_active = status.as_i64() == Some(1) || status.as_str() == Some("active");
            if !is_active {
                let mut status = status;
                PULL_REQUEST_STATUS.normalize(&mut status);
                return Err(AzureError::InvalidArgument(format!(
                    "pull request {} is not active (status: {})",
                    pull_request_id, status
                )));
            }

            let body = json!({
                "status": "completed",
                "lastMergeSourceCommit": pull_request["lastMergeSourceCommit"],
                "completionOptions": completion_options,
            });
            let path = pull_request_path(repository, pull_request_id, "?api-version=7.1");
            let mut merged: Value = client.patch(&path, &body).await?;
            enums::normalize_pull_request(&mut merged);
            Ok(merged)
        })
        .await
}

/// Sets auto-complete so the pull request merges once its policies pass.
pub async fn complete_pull_request(
    client: &AzureDevOpsClient,
    repository: &str,
    pull_request_id: u32,
    options: &CompletionOptions,
) -> Result<Value, AzureError> {
    client
        .operation("pull_requests.complete", async {
            let completion_options = options.to_json()?;
            get_pull_request_checked(client, repository, pull_request_id).await?;
            let user_id = current_user_id(client).await?;

            let body = json!({
                "autoCompleteSetBy": { "id": user_id },
                "completionOptions": completion_options,
            });
            let path = pull_request_path(repository, pull_request_id, "?api-version=7.1");
            let mut updated: Value = client.patch(&path, &body).await?;
            enums::normalize_pull_request(&mut updated);
            Ok(updated)
        })
        .await
}
