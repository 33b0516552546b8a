// Pull requests module
pub mod add_pull_request_comment;
pub mod approve_pull_request;
pub mod complete_pull_request;
pub mod create_pull_request;
pub mod get_pull_request;
pub mod list_pull_request_comments;
pub mod list_pull_requests;
pub mod merge_pull_request;

use crate::azure::pull_requests::CompletionOptions;
use crate::mcp::tools::support::deserialize_optional_non_blank;
use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

pub use add_pull_request_comment::{AddPullRequestCommentArgs, add_pull_request_comment};
pub use approve_pull_request::{ApprovePullRequestArgs, approve_pull_request};
pub use complete_pull_request::{CompletePullRequestArgs, complete_pull_request};
pub use create_pull_request::{CreatePullRequestArgs, create_pull_request};
pub use get_pull_request::{GetPullRequestArgs, get_pull_request};
pub use list_pull_request_comments::{ListPullRequestCommentsArgs, list_pull_request_comments};
pub use list_pull_requests::{ListPullRequestsArgs, list_pull_requests};
pub use merge_pull_request::{MergePullRequestArgs, merge_pull_request};

/// Merge settings shared by merge and auto-complete.
#[derive(Deserialize, JsonSchema, Default)]
pub struct CompletionArgs {
    /// "noFastForward", "squash", "rebase" or "rebaseMerge"
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub merge_strategy: Option<String>,
    /// Delete the source branch once merged
    #[serde(default)]
    pub delete_source_branch: bool,
    /// Message of the merge commit
    #[serde(default, deserialize_with = "deserialize_optional_non_blank")]
    pub merge_commit_message: Option<String>,
}

impl From<CompletionArgs> for CompletionOptions {
    fn from(args: CompletionArgs) -> Self {
        CompletionOptions {
            merge_strategy: args.merge_strategy,
            delete_source_branch: args.delete_source_branch,
            merge_commit_message: args.merge_commit_message,
        }
    }
}
