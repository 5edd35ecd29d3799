use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Album HTTP server.
pub struct DimagramServer {
    config: ServerConfig,
    state: AppState,
}

impl DimagramServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> ServerResult<axum::Router> {
        build_router(self.state.clone(), &self.config)
    }

    /// Start serving requests until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router()?;
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("dimagram server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                // An error here means no signal handler; keep serving.
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
                tracing::info!("shutting down");
            })
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
