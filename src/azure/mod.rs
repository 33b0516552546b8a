pub mod auth;
pub mod boards;
pub mod client;
pub mod enums;
pub mod git;
pub mod models;
pub mod ntlm;
pub mod projects;
pub mod pull_requests;
pub mod work_items;
