use poem_openapi::Object;

/// Envelope for endpoints that return no payload beyond confirmation
#[derive(Object, Debug)]
pub struct MessageResponse {
    pub success: bool,

    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response model for health check endpoint
#[derive(Object, Debug)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,

    /// Deployed service version
    pub version: String,

    /// Timestamp of the health check (ISO 8601 format)
    pub timestamp: String,
}
