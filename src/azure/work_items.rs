use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::{
    Comment, CommentListResponse, JsonPatchOperation, ListResponse, WiqlQuery, WiqlResponse,
    WorkItem,
};
use serde_json::Value;

const BATCH_SIZE: usize = 200;
const MAX_ITEMS: usize = 1000;

/// Filters for [`list_work_items`]. Every filter is optional; the query is
/// always scoped to the configured project.
#[derive(Debug, Default)]
pub struct WorkItemFilter {
    pub work_item_type: Option<String>,
    pub state: Option<String>,
    pub assigned_to: Option<String>,
    pub area_path: Option<String>,
    pub iteration_path: Option<String>,
}

pub async fn get_work_item(
    client: &AzureDevOpsClient,
    id: u32,
    include_latest_n_comments: Option<u32>,
) -> Result<WorkItem, AzureError> {
    let items = get_work_items(client, &[id], include_latest_n_comments).await?;

    items
        .into_iter()
        .next()
        .ok_or_else(|| AzureError::NotFound(format!("Work item {}", id)))
}

pub async fn get_comments(
    client: &AzureDevOpsClient,
    work_item_id: u32,
    top: u32,
) -> Result<Vec<Comment>, AzureError> {
    let path = format!(
        "wit/workitems/{}/comments?api-version=7.1-preview.3&order=desc&$top={}",
        work_item_id, top
    );
    let response: CommentListResponse = client.get(&path).await?;
    Ok(response.comments)
}

pub async fn get_work_items(
    client: &AzureDevOpsClient,
    ids: &[u32],
    include_latest_n_comments: Option<u32>,
) -> Result<Vec<WorkItem>, AzureError> {
    client
        .operation("work_items.get", async {
            if ids.is_empty() {
                return Ok(vec![]);
            }

            let ids_to_fetch = if ids.len() > MAX_ITEMS {
                log::warn!(
                    "Requested {} work items, limiting to {} items",
                    ids.len(),
                    MAX_ITEMS
                );
                &ids[..MAX_ITEMS]
            } else {
                ids
            };

            let mut all_work_items = Vec::new();
            for chunk in ids_to_fetch.chunks(BATCH_SIZE) {
                let ids_str = chunk
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                let path = format!("wit/workitems?ids={}&api-version=7.1", ids_str);
                let response: ListResponse<WorkItem> = client.get(&path).await?;
                all_work_items.extend(response.value);
            }

            if let Some(n) = include_latest_n_comments.filter(|n| *n > 0) {
                for work_item in &mut all_work_items {
                    work_item.comments = Some(get_comments(client, work_item.id, n).await?);
                }
            }

            Ok(all_work_items)
        })
        .await
}

/// Runs a WIQL query and returns the matching ids in query order.
pub async fn query_work_item_ids(
    client: &AzureDevOpsClient,
    query: &str,
) -> Result<Vec<u32>, AzureError> {
    let wiql = WiqlQuery {
        query: query.to_string(),
    };
    let response: WiqlResponse = client.post("wit/wiql?api-version=7.1", &wiql).await?;
    Ok(response.work_items.iter().map(|wi| wi.id).collect())
}

pub async fn query_work_items(
    client: &AzureDevOpsClient,
    query: &str,
    include_latest_n_comments: Option<u32>,
) -> Result<Vec<WorkItem>, AzureError> {
    client
        .operation("work_items.query", async {
            let ids = query_work_item_ids(client, query).await?;
            get_work_items(client, &ids, include_latest_n_comments).await
        })
        .await
}

/// Lists the project's work items matching `filter`, newest change first,
/// then keeps the `skip`/`top` window of the resulting ids.
pub async fn list_work_items(
    client: &AzureDevOpsClient,
    filter: &WorkItemFilter,
    skip: usize,
    top: usize,
) -> Result<Vec<WorkItem>, AzureError> {
    client
        .operation("work_items.list", async {
            let query = build_list_query(client.project(), filter);
            let ids = query_work_item_ids(client, &query).await?;
            let window = page(&ids, skip, top);
            get_work_items(client, window, None).await
        })
        .await
}

pub(crate) fn page<T>(items: &[T], skip: usize, top: usize) -> &[T] {
    let start = skip.min(items.len());
    let end = start.saturating_add(top).min(items.len());
    &items[start..end]
}

fn wiql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub(crate) fn build_list_query(project: &str, filter: &WorkItemFilter) -> String {
    let mut conditions = vec![format!("[System.TeamProject] = {}", wiql_literal(project))];

    if let Some(work_item_type) = &filter.work_item_type {
        conditions.push(format!(
            "[System.WorkItemType] = {}",
            wiql_literal(work_item_type)
        ));
    }
    if let Some(state) = &filter.state {
        conditions.push(format!("[System.State] = {}", wiql_literal(state)));
    }
    if let Some(assigned_to) = &filter.assigned_to {
        conditions.push(format!(
            "[System.AssignedTo] = {}",
            wiql_literal(assigned_to)
        ));
    }
    if let Some(area_path) = &filter.area_path {
        conditions.push(format!(
            "[System.AreaPath] UNDER {}",
            wiql_literal(area_path)
        ));
    }
    if let Some(iteration_path) = &filter.iteration_path {
        conditions.push(format!(
            "[System.IterationPath] UNDER {}",
            wiql_literal(iteration_path)
        ));
    }

    format!(
        "SELECT [System.Id] FROM WorkItems WHERE {} ORDER BY [System.ChangedDate] DESC",
        conditions.join(" AND ")
    )
}

fn field_operations(fields: &[(String, Value)]) -> Vec<JsonPatchOperation> {
    fields
        .iter()
        .map(|(field, value)| {
            JsonPatchOperation::add(format!("/fields/{}", field), value.clone())
        })
        .collect()
}

pub async fn create_work_item(
    client: &AzureDevOpsClient,
    work_item_type: &str,
    fields: &[(String, Value)],
) -> Result<WorkItem, AzureError> {
    client
        .operation("work_items.create", async {
            let operations = field_operations(fields);
            let path = format!(
                "wit/workitems/${}?api-version=7.1",
                urlencoding::encode(work_item_type)
            );
            client.post_patch(&path, &operations).await
        })
        .await
}

pub async fn update_work_item(
    client: &AzureDevOpsClient,
    id: u32,
    fields: &[(String, Value)],
) -> Result<WorkItem, AzureError> {
    client
        .operation("work_items.update", async {
            if fields.is_empty() {
                return Err(AzureError::InvalidArgument(
                    "at least one field must be updated".to_string(),
                ));
            }
            let operations = field_operations(fields);
            let path = format!("wit/workitems/{}?api-version=7.1", id);
            client.patch_patch(&path, &operations).await
        })
        .await
}

pub async fn add_comment(
    client: &AzureDevOpsClient,
    work_item_id: u32,
    text: &str,
) -> Result<Value, AzureError> {
    client
        .operation("work_items.add_comment", async {
            let path = format!(
                "wit/workitems/{}/comments?api-version=7.1-preview.3",
                work_item_id
            );
            let body = serde_json::json!({
                "text": text
            });
            client.post(&path, &body).await
        })
        .await
}

pub async fn link_work_items(
    client: &AzureDevOpsClient,
    source_id: u32,
    target_id: u32,
    link_type: &str,
    comment: Option<&str>,
) -> Result<WorkItem, AzureError> {
    client
        .operation("work_items.link", async {
            let mut relation = serde_json::json!({
                "rel": link_type,
                "url": format!("{}/_apis/wit/workItems/{}", client.base_url(), target_id),
            });
            if let Some(comment) = comment {
                relation["attributes"] = serde_json::json!({ "comment": comment });
            }
            let operations = vec![JsonPatchOperation::add("/relations/-", relation)];

            let path = format!("wit/workitems/{}?api-version=7.1", source_id);
            client.patch_patch(&path, &operations).await
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::client::tests::cloud_client;
    use httpmock::prelude::*;
    use serde_json::json;

    fn work_item_json(id: u32, title: &str) -> Value {
        json!({
            "id": id,
            "rev": 1,
            "fields": { "System.Title": title, "System.State": "New" },
            "url": format!("https://dev.azure.com/contoso/_apis/wit/workItems/{}", id)
        })
    }

    #[test]
    fn page_slices_within_bounds() {
        let ids = [1, 2, 3, 4, 5];
        assert_eq!(page(&ids, 0, 2), &[1, 2]);
        assert_eq!(page(&ids, 3, 10), &[4, 5]);
        assert!(page(&ids, 7, 2).is_empty());
        assert!(page(&ids, 1, 0).is_empty());
        assert_eq!(page(&ids, 1, usize::MAX), &[2, 3, 4, 5]);
    }

    #[test]
    fn list_query_includes_filters_and_escapes_quotes() {
        let filter = WorkItemFilter {
            work_item_type: Some("Bug".into()),
            assigned_to: Some("O'Brien".into()),
            area_path: Some("Fabrikam\\Web".into()),
            ..Default::default()
        };
        let query = build_list_query("Fabrikam", &filter);
        assert_eq!(
            query,
            "SELECT [System.Id] FROM WorkItems WHERE [System.TeamProject] = 'Fabrikam' \
             AND [System.WorkItemType] = 'Bug' AND [System.AssignedTo] = 'O''Brien' \
             AND [System.AreaPath] UNDER 'Fabrikam\\Web' ORDER BY [System.ChangedDate] DESC"
        );
    }

    #[tokio::test]
    async fn list_fetches_only_the_requested_window() {
        let server = MockServer::start();
        let wiql = server.mock(|when, then| {
            when.method(POST).path("/contoso/Fabrikam/_apis/wit/wiql");
            then.status(200).json_body(json!({
                "workItems": [{ "id": 10 }, { "id": 11 }, { "id": 12 }, { "id": 13 }]
            }));
        });
        let batch = server.mock(|when, then| {
            when.method(GET)
                .path("/contoso/Fabrikam/_apis/wit/workitems")
                .query_param("ids", "11,12");
            then.status(200).json_body(json!({
                "count": 2,
                "value": [work_item_json(11, "b"), work_item_json(12, "c")]
            }));
        });

        let client = cloud_client(&server);
        let items = list_work_items(&client, &WorkItemFilter::default(), 1, 2)
            .await
            .unwrap();

        wiql.assert();
        batch.assert();
        assert_eq!(items.iter().map(|w| w.id).collect::<Vec<_>>(), [11, 12]);
    }

    #[tokio::test]
    async fn empty_window_makes_no_batch_request() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/contoso/Fabrikam/_apis/wit/wiql");
            then.status(200).json_body(json!({ "workItems": [{ "id": 1 }] }));
        });
        let batch = server.mock(|when, then| {
            when.method(GET).path("/contoso/Fabrikam/_apis/wit/workitems");
            then.status(200).json_body(json!({ "value": [] }));
        });

        let client = cloud_client(&server);
        let items = list_work_items(&client, &WorkItemFilter::default(), 5, 10)
            .await
            .unwrap();

        assert!(items.is_empty());
        batch.assert_calls(0);
    }

    #[tokio::test]
    async fn missing_work_item_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/contoso/Fabrikam/_apis/wit/workitems");
            then.status(200).json_body(json!({ "count": 0, "value": [] }));
        });

        let client = cloud_client(&server);
        let err = get_work_item(&client, 42, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Work item 42 not found");
    }

    #[tokio::test]
    async fn get_attaches_latest_comments() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/contoso/Fabrikam/_apis/wit/workitems")
                .query_param("ids", "7");
            then.status(200)
                .json_body(json!({ "value": [work_item_json(7, "a")] }));
        });
        let comments = server.mock(|when, then| {
            when.method(GET)
                .path("/contoso/Fabrikam/_apis/wit/workitems/7/comments")
                .query_param("$top", "2");
            then.status(200).json_body(json!({
                "comments": [{ "id": 1, "text": "<p>Looks good</p>" }]
            }));
        });

        let client = cloud_client(&server);
        let item = get_work_item(&client, 7, Some(2)).await.unwrap();

        comments.assert();
        let attached = item.comments.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].text, "<p>Looks good</p>");
    }

    #[tokio::test]
    async fn create_sends_json_patch_document() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/contoso/Fabrikam/_apis/wit/workitems/$Bug")
                .header("content-type", "application/json-patch+json")
                .json_body(json!([
                    { "op": "add", "path": "/fields/System.Title", "value": "Crash on save" }
                ]));
            then.status(200).json_body(work_item_json(99, "Crash on save"));
        });

        let client = cloud_client(&server);
        let created = create_work_item(
            &client,
            "Bug",
            &[("System.Title".to_string(), json!("Crash on save"))],
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(created.id, 99);
    }

    #[tokio::test]
    async fn update_without_fields_is_rejected_locally() {
        let server = MockServer::start();
        let client = cloud_client(&server);
        let err = update_work_item(&client, 1, &[]).await.unwrap_err();
        assert!(matches!(err, AzureError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn link_points_at_the_configured_organization() {
        let server = MockServer::start();
        let target_url = format!("{}/_apis/wit/workItems/2", server.url("/contoso"));
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/contoso/Fabrikam/_apis/wit/workitems/1")
                .json_body(json!([{
                    "op": "add",
                    "path": "/relations/-",
                    "value": {
                        "rel": "System.LinkTypes.Related",
                        "url": target_url,
                        "attributes": { "comment": "same root cause" }
                    }
                }]));
            then.status(200).json_body(work_item_json(1, "a"));
        });

        let client = cloud_client(&server);
        link_work_items(
            &client,
            1,
            2,
            "System.LinkTypes.Related",
            Some("same root cause"),
        )
        .await
        .unwrap();
        mock.assert();
    }
}
