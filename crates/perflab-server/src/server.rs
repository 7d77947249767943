//! Server state, router construction, and serving.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

use perflab_core::RunService;

use crate::config::ServerConfig;
use crate::routes;

/// Shared application state for all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,

    /// Run flow service.
    pub service: RunService,
}

impl AppState {
    /// Create state from configuration.
    pub fn new(config: ServerConfig) -> Self {
        let service = RunService::new(config.pipeline.clone());
        Self { config, service }
    }
}

/// Build the router for one server instance.
pub fn create_router(state: AppState) -> Router {
    let max_upload = state.config.max_upload_bytes;
    routes::routes()
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "perflabd listening");
    axum::serve(listener, app).await?;
    Ok(())
}
