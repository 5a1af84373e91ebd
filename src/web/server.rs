//! Web server for filevault.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use super::handlers::AppState;
use super::router::create_router;
use crate::config::ServerConfig;
use crate::{Result, VaultError};

/// HTTP server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    state: AppState,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .map_err(|e| {
                VaultError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.host, config.port
                ))
            })?;
        Ok(Self { addr, state })
    }

    /// Get the configured address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bind the listener.
    ///
    /// Kept apart from [`serve`](Self::serve) so a bind failure can be
    /// told apart from a serving failure.
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.addr).await
    }

    /// Serve on `listener` until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let local_addr = listener.local_addr()?;
        let router = create_router(self.state);

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
