use anyhow::Context;
use azure_devops_mcp::azure::auth::{CredentialHandler, EntraCredentialHandler};
use azure_devops_mcp::azure::client::AzureDevOpsClient;
use azure_devops_mcp::config::{AuthKind, AzureDevOpsConfig, EnvSettings};
use azure_devops_mcp::logging;
use azure_devops_mcp::mcp::allowed_tools::parse_allowed_tools;
use azure_devops_mcp::mcp::server::AzureMcpServer;
use azure_devops_mcp::server::http;
use azure_identity::DefaultAzureCredential;
use clap::Parser;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run in server mode
    #[arg(long)]
    server: bool,

    /// IP address the server listens on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to run the server on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Comma-separated names of the tools to expose (all when unset)
    #[arg(long, env = "ALLOWED_TOOLS")]
    allowed_tools: Option<String>,

    /// "true" keeps stderr quiet and logs to the log file only
    #[arg(long, env = "MCP_MODE")]
    mcp_mode: Option<String>,

    #[command(flatten)]
    azure: EnvSettings,
}

/// Credential handler for `entra` auth, backed by the default Azure credential chain.
fn entra_handler(settings: &EnvSettings) -> Option<Arc<dyn CredentialHandler>> {
    let wants_entra = settings
        .auth_type
        .as_deref()
        .and_then(AuthKind::parse)
        == Some(AuthKind::Entra);
    wants_entra.then(|| {
        Arc::new(EntraCredentialHandler::new(Arc::new(
            DefaultAzureCredential::default(),
        ))) as Arc<dyn CredentialHandler>
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mcp_mode = args.mcp_mode.as_deref() == Some("true");
    logging::init(&logging::log_dir_for_exe()?, mcp_mode)?;

    log::debug!("Settings: {:?}", args.azure);
    let config = AzureDevOpsConfig::resolve(&args.azure, entra_handler(&args.azure))
        .context("Invalid Azure DevOps configuration")?;
    log::info!("Configuration: {}", config.sanitized());

    let client = AzureDevOpsClient::connect(&config)?;
    let allowed = parse_allowed_tools(
        args.allowed_tools.as_deref(),
        &AzureMcpServer::tool_names(),
    );
    let mcp_server = AzureMcpServer::new(client, &allowed);

    if args.server {
        let addr = http::bind_address(&args.host, args.port)?;
        log::info!("Starting web server on {}", addr);
        http::run_server(mcp_server, addr).await?;
    } else {
        log::info!("Starting stdio server");
        let service = mcp_server.serve(stdio()).await?;
        service.waiting().await?;
    }

    Ok(())
}
