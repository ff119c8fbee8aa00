// API-edge error types - ApiResponse enums per endpoint group
pub mod admin;
pub mod auth;

pub use admin::AdminError;
pub use auth::AuthError;

use poem_openapi::Object;
use std::collections::HashMap;

/// Uniform error envelope: `success` is always false, `errors` carries
/// field-level messages when the failure originated in validation.
#[derive(Object, Debug)]
pub struct ErrorEnvelope {
    /// Always false on error responses
    pub success: bool,

    /// Human-readable error message
    pub message: String,

    /// Field name to messages, present for validation failures
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ErrorEnvelope {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(message: impl Into<String>, errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: Some(errors),
        }
    }
}
