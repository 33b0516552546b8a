pub mod boards;
pub mod git;
pub mod projects;
pub mod pull_requests;
pub mod support;
pub mod work_items;
