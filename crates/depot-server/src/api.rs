//! JSON bodies and paths of the Depot HTTP API.

use serde::{Deserialize, Serialize};

/// Route paths served by Depot.
pub mod endpoints {
    pub const ROOT: &str = "/";
    pub const FILES: &str = "/files";
    pub const FILE: &str = "/files/:name";
    pub const HEALTH: &str = "/health";
    pub const METRICS: &str = "/metrics";
}

/// Service name reported by the root and health endpoints.
pub const SERVICE_NAME: &str = "File Storage API";

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Landing page listing the available endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub endpoints: Vec<String>,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            message: SERVICE_NAME.into(),
            endpoints: vec![
                "GET /files/{filename}".into(),
                "POST /files".into(),
                "GET /files".into(),
                "GET /health".into(),
                "GET /metrics".into(),
            ],
        }
    }
}

/// Result of a successful upload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub size: u64,
    /// Advisory content type sent by the client; not persisted.
    pub content_type: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub files: Vec<String>,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".into(),
            timestamp: now_rfc3339(),
            service: SERVICE_NAME.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub files_stored_total: u64,
    pub files_current: u64,
    pub total_storage_bytes: u64,
    pub total_storage_mb: f64,
    pub timestamp: String,
}

impl From<depot_store::StorageSnapshot> for MetricsResponse {
    fn from(snapshot: depot_store::StorageSnapshot) -> Self {
        Self {
            files_stored_total: snapshot.files_stored_total,
            files_current: snapshot.files_current,
            total_storage_bytes: snapshot.total_storage_bytes,
            total_storage_mb: snapshot.total_storage_mb(),
            timestamp: now_rfc3339(),
        }
    }
}

/// Body of every error response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_defaults() {
        let h = HealthResponse::healthy();
        assert_eq!(h.status, "healthy");
        assert_eq!(h.service, SERVICE_NAME);
        assert!(chrono::DateTime::parse_from_rfc3339(&h.timestamp).is_ok());
    }

    #[test]
    fn metrics_from_snapshot() {
        let m = MetricsResponse::from(depot_store::StorageSnapshot {
            files_stored_total: 4,
            files_current: 3,
            total_storage_bytes: 3 * 1024 * 1024,
        });
        assert_eq!(m.files_stored_total, 4);
        assert_eq!(m.files_current, 3);
        assert_eq!(m.total_storage_mb, 3.0);
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::FILES, "/files");
        assert_eq!(endpoints::FILE, "/files/:name");
        assert_eq!(endpoints::METRICS, "/metrics");
    }
}
