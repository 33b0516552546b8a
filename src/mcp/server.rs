use crate::azure::client::AzureDevOpsClient;
use crate::mcp::tools::boards::{
    GetCurrentSprintArgs, ListBoardColumnsArgs, ListBoardsArgs, ListSprintWorkItemsArgs,
    ListSprintsArgs,
};
use crate::mcp::tools::git::{
    GetFileContentArgs, GetRepositoryArgs, ListBranchesArgs, ListCommitsArgs,
};
use crate::mcp::tools::projects::{ListProjectsArgs, ListTeamMembersArgs};
use crate::mcp::tools::pull_requests::{
    AddPullRequestCommentArgs, ApprovePullRequestArgs, CompletePullRequestArgs,
    CreatePullRequestArgs, GetPullRequestArgs, ListPullRequestCommentsArgs, ListPullRequestsArgs,
    MergePullRequestArgs,
};
use crate::mcp::tools::work_items::{
    AddCommentArgs, CreateWorkItemArgs, GetWorkItemArgs, GetWorkItemsArgs, LinkWorkItemsArgs,
    ListWorkItemsArgs, QueryWorkItemsByWiqlArgs, UpdateWorkItemArgs,
};
use crate::mcp::tools::{boards, git, projects, pull_requests, work_items};
use rmcp::{
    ErrorData as McpError,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct AzureMcpServer {
    client: Arc<AzureDevOpsClient>,
    tool_router: ToolRouter<Self>,
}

// Work items

#[tool_router(router = work_item_tools)]
impl AzureMcpServer {
    #[tool(description = "Get a work item by ID, optionally with its latest comments")]
    async fn azdo_get_work_item(
        &self,
        Parameters(args): Parameters<GetWorkItemArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::get_work_item(&self.client, args).await
    }

    #[tool(description = "Get several work items by ID (CSV output)")]
    async fn azdo_get_work_items(
        &self,
        Parameters(args): Parameters<GetWorkItemsArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::get_work_items(&self.client, args).await
    }

    #[tool(
        description = "List work items of the project filtered by type, state, assignee, area or iteration, most recently changed first (CSV output)"
    )]
    async fn azdo_list_work_items(
        &self,
        Parameters(args): Parameters<ListWorkItemsArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::list_work_items(&self.client, args).await
    }

    #[tool(description = "Run a WIQL query and return the matching work items (CSV output)")]
    async fn azdo_query_work_items_by_wiql(
        &self,
        Parameters(args): Parameters<QueryWorkItemsByWiqlArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::query_work_items_by_wiql(&self.client, args).await
    }

    #[tool(
        description = "Create a work item. Any other field can be set through `fields` using its reference name"
    )]
    async fn azdo_create_work_item(
        &self,
        Parameters(args): Parameters<CreateWorkItemArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::create_work_item(&self.client, args).await
    }

    #[tool(description = "Update fields of an existing work item")]
    async fn azdo_update_work_item(
        &self,
        Parameters(args): Parameters<UpdateWorkItemArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::update_work_item(&self.client, args).await
    }

    #[tool(description = "Add a comment to a work item")]
    async fn azdo_add_work_item_comment(
        &self,
        Parameters(args): Parameters<AddCommentArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::add_comment(&self.client, args).await
    }

    #[tool(
        description = "Link two work items. link_type tells what the target is to the source: Parent, Child, Related, Duplicate, Dependency"
    )]
    async fn azdo_link_work_items(
        &self,
        Parameters(args): Parameters<LinkWorkItemsArgs>,
    ) -> Result<CallToolResult, McpError> {
        work_items::link_work_items(&self.client, args).await
    }
}

// Boards and sprints

#[tool_router(router = board_tools)]
impl AzureMcpServer {
    #[tool(description = "List the boards of a team (CSV output)")]
    async fn azdo_list_boards(
        &self,
        Parameters(args): Parameters<ListBoardsArgs>,
    ) -> Result<CallToolResult, McpError> {
        boards::list_boards(&self.client, args).await
    }

    #[tool(description = "List the columns of a board with their WIP limits (CSV output)")]
    async fn azdo_list_board_columns(
        &self,
        Parameters(args): Parameters<ListBoardColumnsArgs>,
    ) -> Result<CallToolResult, McpError> {
        boards::list_board_columns(&self.client, args).await
    }

    #[tool(
        description = "List the sprints of a team, optionally only past, current or future ones"
    )]
    async fn azdo_list_sprints(
        &self,
        Parameters(args): Parameters<ListSprintsArgs>,
    ) -> Result<CallToolResult, McpError> {
        boards::list_sprints(&self.client, args).await
    }

    #[tool(description = "Get the current sprint of a team")]
    async fn azdo_get_current_sprint(
        &self,
        Parameters(args): Parameters<GetCurrentSprintArgs>,
    ) -> Result<CallToolResult, McpError> {
        boards::get_current_sprint(&self.client, args).await
    }

    #[tool(description = "List the work items planned in a sprint, the current one by default")]
    async fn azdo_list_sprint_work_items(
        &self,
        Parameters(args): Parameters<ListSprintWorkItemsArgs>,
    ) -> Result<CallToolResult, McpError> {
        boards::list_sprint_work_items(&self.client, args).await
    }
}

// Projects and teams

#[tool_router(router = project_tools)]
impl AzureMcpServer {
    #[tool(description = "List the projects of the organization")]
    async fn azdo_list_projects(
        &self,
        Parameters(args): Parameters<ListProjectsArgs>,
    ) -> Result<CallToolResult, McpError> {
        projects::list_projects(&self.client, args).await
    }

    #[tool(description = "Get details of the configured project")]
    async fn azdo_get_project(&self) -> Result<CallToolResult, McpError> {
        projects::get_project(&self.client).await
    }

    #[tool(description = "List all teams in the project")]
    async fn azdo_list_teams(&self) -> Result<CallToolResult, McpError> {
        projects::list_teams(&self.client).await
    }

    #[tool(description = "List the members of a team")]
    async fn azdo_list_team_members(
        &self,
        Parameters(args): Parameters<ListTeamMembersArgs>,
    ) -> Result<CallToolResult, McpError> {
        projects::list_team_members(&self.client, args).await
    }
}

// Repositories and pull requests

#[tool_router(router = git_tools)]
impl AzureMcpServer {
    #[tool(description = "List the Git repositories of the project")]
    async fn azdo_list_repositories(&self) -> Result<CallToolResult, McpError> {
        git::list_repositories(&self.client).await
    }

    #[tool(description = "Get a Git repository by ID or name")]
    async fn azdo_get_repository(
        &self,
        Parameters(args): Parameters<GetRepositoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        git::get_repository(&self.client, args).await
    }

    #[tool(description = "List the branches of a repository")]
    async fn azdo_list_branches(
        &self,
        Parameters(args): Parameters<ListBranchesArgs>,
    ) -> Result<CallToolResult, McpError> {
        git::list_branches(&self.client, args).await
    }

    #[tool(description = "Read the content of a file in a repository")]
    async fn azdo_get_file_content(
        &self,
        Parameters(args): Parameters<GetFileContentArgs>,
    ) -> Result<CallToolResult, McpError> {
        git::get_file_content(&self.client, args).await
    }

    #[tool(description = "List commits of a repository, filtered by branch, author, path or date")]
    async fn azdo_list_commits(
        &self,
        Parameters(args): Parameters<ListCommitsArgs>,
    ) -> Result<CallToolResult, McpError> {
        git::list_commits(&self.client, args).await
    }

    #[tool(description = "List pull requests of a repository")]
    async fn azdo_list_pull_requests(
        &self,
        Parameters(args): Parameters<ListPullRequestsArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::list_pull_requests(&self.client, args).await
    }

    #[tool(description = "Get a pull request of a repository")]
    async fn azdo_get_pull_request(
        &self,
        Parameters(args): Parameters<GetPullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::get_pull_request(&self.client, args).await
    }

    #[tool(description = "Create a pull request")]
    async fn azdo_create_pull_request(
        &self,
        Parameters(args): Parameters<CreatePullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::create_pull_request(&self.client, args).await
    }

    #[tool(description = "List the comment threads of a pull request")]
    async fn azdo_list_pull_request_comments(
        &self,
        Parameters(args): Parameters<ListPullRequestCommentsArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::list_pull_request_comments(&self.client, args).await
    }

    #[tool(description = "Comment on a pull request, in a new thread or as a reply")]
    async fn azdo_add_pull_request_comment(
        &self,
        Parameters(args): Parameters<AddPullRequestCommentArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::add_pull_request_comment(&self.client, args).await
    }

    #[tool(description = "Approve a pull request as the authenticated user")]
    async fn azdo_approve_pull_request(
        &self,
        Parameters(args): Parameters<ApprovePullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::approve_pull_request(&self.client, args).await
    }

    #[tool(description = "Merge an active pull request now")]
    async fn azdo_merge_pull_request(
        &self,
        Parameters(args): Parameters<MergePullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::merge_pull_request(&self.client, args).await
    }

    #[tool(description = "Set a pull request to complete automatically once its policies pass")]
    async fn azdo_complete_pull_request(
        &self,
        Parameters(args): Parameters<CompletePullRequestArgs>,
    ) -> Result<CallToolResult, McpError> {
        pull_requests::complete_pull_request(&self.client, args).await
    }
}

impl AzureMcpServer {
    /// Server exposing only the tools named in `allowed_tools`.
    pub fn new(client: AzureDevOpsClient, allowed_tools: &BTreeSet<String>) -> Self {
        let tool_router = Self::restrict(Self::all_tools_router(), allowed_tools);
        log::info!("Exposing {} tools", tool_router.list_all().len());
        Self {
            client: Arc::new(client),
            tool_router,
        }
    }

    fn all_tools_router() -> ToolRouter<Self> {
        Self::work_item_tools() + Self::board_tools() + Self::project_tools() + Self::git_tools()
    }

    fn restrict(
        mut router: ToolRouter<Self>,
        allowed_tools: &BTreeSet<String>,
    ) -> ToolRouter<Self> {
        for name in Self::tool_names() {
            if !allowed_tools.contains(&name) {
                router.remove_route(&name);
            }
        }
        router
    }

    /// Names of every tool of every group.
    pub fn tool_names() -> BTreeSet<String> {
        Self::all_tools_router()
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }
}

#[tool_handler]
impl rmcp::ServerHandler for AzureMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Use these tools to work with Azure DevOps work items, boards, sprints, repositories and pull requests of the configured project".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(router: &ToolRouter<AzureMcpServer>) -> BTreeSet<String> {
        router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect()
    }

    #[test]
    fn groups_register_their_tools() {
        assert_eq!(names(&AzureMcpServer::work_item_tools()).len(), 8);
        assert_eq!(names(&AzureMcpServer::board_tools()).len(), 5);
        assert_eq!(names(&AzureMcpServer::project_tools()).len(), 4);
        assert_eq!(names(&AzureMcpServer::git_tools()).len(), 13);
        assert_eq!(AzureMcpServer::tool_names().len(), 30);
    }

    #[test]
    fn tool_names_are_prefixed() {
        let all = AzureMcpServer::tool_names();
        assert!(all.iter().all(|name| name.starts_with("azdo_")));
        assert!(all.contains("azdo_add_work_item_comment"));
        assert!(all.contains("azdo_complete_pull_request"));
    }

    #[test]
    fn restrict_keeps_only_allowed_tools() {
        let allowed: BTreeSet<String> = ["azdo_get_work_item", "azdo_list_branches", "bogus"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let router = AzureMcpServer::restrict(AzureMcpServer::all_tools_router(), &allowed);
        let expected: BTreeSet<String> = ["azdo_get_work_item", "azdo_list_branches"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(names(&router), expected);
    }

    #[test]
    fn unrestricted_router_has_every_tool() {
        let all = AzureMcpServer::tool_names();
        let router = AzureMcpServer::restrict(AzureMcpServer::all_tools_router(), &all);
        assert_eq!(names(&router), all);
    }
}
