//! HTTP server for Depot.
//!
//! Exposes the file store over a small JSON/HTTP API: multipart upload,
//! raw download, listing, health and metrics. Storage work runs on tokio's
//! blocking pool; every route is wrapped by the timing middleware.

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod router;
pub mod server;
pub mod state;

pub use api::{endpoints, HealthResponse, ListResponse, MetricsResponse, UploadResponse};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::build_router;
pub use server::DepotServer;
pub use state::AppState;
