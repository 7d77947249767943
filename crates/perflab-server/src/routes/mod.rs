//! HTTP route handlers.

pub mod health;
pub mod run;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::server::AppState;

/// Response body format for the run endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// HTML fragment, the browser-facing default.
    #[default]
    Html,
    /// JSON document for API clients.
    Json,
}

/// All routes for one server instance.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/run", post(run::run))
}
