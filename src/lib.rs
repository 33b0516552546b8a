pub mod azure;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod server;
