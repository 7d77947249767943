//! Perflab HTTP server.
//!
//! Exposes the run flow over HTTP: `POST /run` accepts a multipart upload
//! plus run parameters and answers with the rendered report; `GET /health`
//! is a liveness probe.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::ResponseFormat;
pub use server::{create_router, serve, AppState};
