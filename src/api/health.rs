use crate::types::dto::common::HealthResponse;
use chrono::Utc;
use poem_openapi::{payload::Json, OpenApi, Tags};

/// Liveness probe, unauthenticated
pub struct HealthApi;

#[derive(Tags)]
enum HealthTags {
    /// Service health
    Health,
}

#[OpenApi]
impl HealthApi {
    /// Current service status, version, and server time
    #[oai(path = "/health", method = "get", tag = "HealthTags::Health")]
    async fn health(&self) -> Json<HealthResponse> {
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
        })
    }
}
