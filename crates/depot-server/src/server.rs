use std::future::Future;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// Depot HTTP server.
pub struct DepotServer {
    config: ServerConfig,
    state: AppState,
}

impl DepotServer {
    /// Validate `config` and open its storage root.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;
        let state = AppState::open(&config.storage_root)?;
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone(), self.config.body_limit())
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(
            "Depot listening on {} (root: {})",
            listener.local_addr()?,
            self.state.resolver().root().display()
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await?;
        tracing::info!("Depot stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
