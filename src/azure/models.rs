use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The `{ "count": n, "value": [...] }` envelope used by most list endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub count: Option<u32>,
    pub value: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u32,
    #[serde(default)]
    pub rev: Option<u32>,
    pub fields: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Vec<WorkItemRelation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkItemRelation {
    pub rel: String,
    pub url: String,
    #[serde(default)]
    pub attributes: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub created_by: Option<IdentityRef>,
    #[serde(default)]
    pub created_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WiqlQuery {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WiqlResponse {
    #[serde(rename = "workItems", default)]
    pub work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkItemReference {
    pub id: u32,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonPatchOperation {
    pub op: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl JsonPatchOperation {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: "add".to_string(),
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }
}

/// `_apis/connectionData`, used to find the authenticated user.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionData {
    pub authenticated_user: AuthenticatedUser,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default)]
    pub provider_display_name: Option<String>,
}
