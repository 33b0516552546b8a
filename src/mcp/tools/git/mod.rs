// Git repositories module
pub mod get_file_content;
pub mod get_repository;
pub mod list_branches;
pub mod list_commits;
pub mod list_repositories;

pub use get_file_content::{GetFileContentArgs, get_file_content};
pub use get_repository::{GetRepositoryArgs, get_repository};
pub use list_branches::{ListBranchesArgs, list_branches};
pub use list_commits::{ListCommitsArgs, list_commits};
pub use list_repositories::list_repositories;
