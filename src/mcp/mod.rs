pub mod allowed_tools;
pub mod server;
pub mod tools;
