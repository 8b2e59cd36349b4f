//! HTTP server setup and connection handling.

use super::router;
use super::state::AppState;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use txt2svg_core::error::{Result, Txt2SvgError};

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get the socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let host: std::net::IpAddr =
            self.host.parse().map_err(|e| Txt2SvgError::ConfigValue {
                field: "host".to_string(),
                cause: format!("'{}' is not an IP address: {}", self.host, e),
            })?;
        Ok(SocketAddr::new(host, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// HTTP server for txt2svg.
pub struct ApiServer {
    /// Server configuration.
    config: ServerConfig,
    /// Shared application state.
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server.
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Get a reference to the application state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.config.socket_addr()?;
        TcpListener::bind(addr).await.map_err(|e| Txt2SvgError::Io {
            path: std::path::PathBuf::from(addr.to_string()),
            cause: e.to_string(),
        })
    }

    /// Bind and serve until `shutdown` completes.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from `listener` until `shutdown` completes.
    ///
    /// Connections already accepted finish on their own tasks.
    pub async fn serve(
        &self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let local_addr = listener.local_addr().map_err(|e| Txt2SvgError::Network {
            cause: e.to_string(),
        })?;

        tracing::info!(
            addr = %local_addr,
            assets = %self.state.renderer.assets().describe(),
            "API server started"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };

                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&self.state);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { router::route(req, state).await }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            if !e.is_incomplete_message() {
                                tracing::warn!(
                                    remote = %remote_addr,
                                    error = %e,
                                    "HTTP connection error"
                                );
                            }
                        }
                    });
                }
                _ = &mut shutdown => {
                    tracing::info!(uptime_secs = self.state.uptime_secs(), "API server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn server_config_socket_addr() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        let addr = config.socket_addr().unwrap();

        assert_eq!(addr.port(), 9000);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
    }

    #[test]
    fn server_config_rejects_hostnames() {
        let err = ServerConfig::new("localhost", 9000).socket_addr().unwrap_err();
        assert_eq!(err.code(), "E801");
    }
}
