use crate::mcp::server::AzureMcpServer;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder,
    service::TowerToHyperService,
};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

/// Address the HTTP transport listens on, from a host IP and a port.
pub fn bind_address(host: &str, port: u16) -> io::Result<SocketAddr> {
    let ip: IpAddr = host.trim().parse().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid listen address '{}': expected an IP address", host),
        )
    })?;
    Ok(SocketAddr::new(ip, port))
}

/// Serves the MCP streamable HTTP transport on `addr` until Ctrl+C.
pub async fn run_server(server: AzureMcpServer, addr: SocketAddr) -> io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(server, listener, async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Accepts connections on `listener` until `shutdown` resolves.
///
/// Connections already accepted keep running on their own tasks.
pub async fn serve(
    server: AzureMcpServer,
    listener: TcpListener,
    shutdown: impl Future<Output = ()>,
) -> io::Result<()> {
    let service = TowerToHyperService::new(StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    ));
    log::info!("Listening on http://{}", listener.local_addr()?);

    tokio::pin!(shutdown);
    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => {
                log::info!("Shutdown requested, no longer accepting connections");
                return Ok(());
            }
        };
        log::debug!("Accepted connection from {}", peer);
        let io = TokioIo::new(stream);
        let service = service.clone();

        tokio::spawn(async move {
            if let Err(err) = Builder::new(TokioExecutor::default())
                .serve_connection(io, service)
                .await
            {
                log::error!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::client::tests::cloud_client;
    use httpmock::MockServer;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    #[test]
    fn bind_address_accepts_ipv4_and_ipv6() {
        assert_eq!(
            bind_address("0.0.0.0", 3000).unwrap(),
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(
            bind_address(" ::1 ", 8080).unwrap(),
            "[::1]:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn bind_address_rejects_host_names() {
        let err = bind_address("localhost", 3000).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(err.to_string().contains("localhost"));
    }

    #[tokio::test]
    async fn serve_accepts_connections_until_shutdown() {
        let azure = MockServer::start();
        let server = AzureMcpServer::new(cloud_client(&azure), &AzureMcpServer::tool_names());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(server, listener, async move {
            let _ = stopped.await;
        }));

        TcpStream::connect(addr).await.unwrap();
        stop.send(()).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
