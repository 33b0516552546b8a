// Projects and teams module
pub mod get_project;
pub mod list_projects;
pub mod list_team_members;
pub mod list_teams;

pub use get_project::get_project;
pub use list_projects::{ListProjectsArgs, list_projects};
pub use list_team_members::{ListTeamMembersArgs, list_team_members};
pub use list_teams::list_teams;
