use super::ErrorEnvelope;
use crate::errors::internal::{
    AuthFailure, AuthzFailure, DuplicateField, InternalError, ValidationErrors,
};
use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

/// Error responses for the administrative surfaces (/admin, /users,
/// /roles, /notifications).
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// Field-level validation failed or duplicate field
    #[oai(status = 400)]
    ValidationFailed(Json<ErrorEnvelope>),

    /// Invalid, malformed, or expired bearer token
    #[oai(status = 401)]
    Unauthorized(Json<ErrorEnvelope>),

    /// Missing capability, Manager scope violation, or superuser-only action
    #[oai(status = 403)]
    Forbidden(Json<ErrorEnvelope>),

    /// Unknown user, role, notification, or navigation item
    #[oai(status = 404)]
    NotFound(Json<ErrorEnvelope>),

    /// Too many requests
    #[oai(status = 429)]
    Throttled(Json<ErrorEnvelope>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorEnvelope>),
}

impl AdminError {
    pub fn validation_failed(errors: ValidationErrors) -> Self {
        AdminError::ValidationFailed(Json(ErrorEnvelope::with_errors(
            "Validation failed",
            errors.fields,
        )))
    }

    pub fn duplicate_field(field: DuplicateField) -> Self {
        AdminError::ValidationFailed(Json(ErrorEnvelope::with_errors(
            field.message(),
            ValidationErrors::single(field.field_name(), field.message()).fields,
        )))
    }

    pub fn unauthorized(message: &str) -> Self {
        AdminError::Unauthorized(Json(ErrorEnvelope::message(message)))
    }

    pub fn missing_capability(name: &str) -> Self {
        AdminError::Forbidden(Json(ErrorEnvelope::message(format!(
            "You do not have the '{}' capability",
            name
        ))))
    }

    pub fn missing_permission(name: &str) -> Self {
        AdminError::Forbidden(Json(ErrorEnvelope::message(format!(
            "You do not have the '{}' permission",
            name
        ))))
    }

    pub fn manager_scope_violation() -> Self {
        AdminError::Forbidden(Json(ErrorEnvelope::message(
            "You may only act on users you created",
        )))
    }

    pub fn superuser_required() -> Self {
        AdminError::Forbidden(Json(ErrorEnvelope::message(
            "This action requires superuser access",
        )))
    }

    pub fn self_action_forbidden() -> Self {
        AdminError::Forbidden(Json(ErrorEnvelope::message(
            "You cannot perform this action on your own account",
        )))
    }

    pub fn not_found(message: &str) -> Self {
        AdminError::NotFound(Json(ErrorEnvelope::message(message)))
    }

    pub fn throttled() -> Self {
        AdminError::Throttled(Json(ErrorEnvelope::message(
            "Too many requests, try again later",
        )))
    }

    fn internal_server_error() -> Self {
        AdminError::InternalError(Json(ErrorEnvelope::message("An internal error occurred")))
    }

    /// The single conversion point from domain errors to the admin wire.
    pub fn from_internal(err: InternalError) -> Self {
        match err {
            InternalError::Validation(errors) => Self::validation_failed(errors),
            InternalError::Duplicate(field) => Self::duplicate_field(field),
            InternalError::Authentication(failure) => match failure {
                AuthFailure::ExpiredToken => Self::unauthorized("Token has expired"),
                _ => Self::unauthorized("Invalid or malformed token"),
            },
            InternalError::Authorization(failure) => match failure {
                AuthzFailure::MissingNavCapability(name) => Self::missing_capability(&name),
                AuthzFailure::MissingObjectPermission(name) => Self::missing_permission(&name),
                AuthzFailure::ManagerScopeViolation => Self::manager_scope_violation(),
                AuthzFailure::SuperuserRequired => Self::superuser_required(),
                AuthzFailure::SelfActionForbidden => Self::self_action_forbidden(),
            },
            InternalError::NotFound(kind) => {
                Self::not_found(&format!("The requested {} was not found", kind.name()))
            }
            InternalError::Database(db_err) => {
                tracing::error!("Database error in admin operation: {}", db_err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, message } => {
                tracing::error!("Crypto error in {}: {}", operation, message);
                Self::internal_server_error()
            }
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AdminError::ValidationFailed(json) => json.0.message.clone(),
            AdminError::Unauthorized(json) => json.0.message.clone(),
            AdminError::Forbidden(json) => json.0.message.clone(),
            AdminError::NotFound(json) => json.0.message.clone(),
            AdminError::Throttled(json) => json.0.message.clone(),
            AdminError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl From<InternalError> for AdminError {
    fn from(err: InternalError) -> Self {
        Self::from_internal(err)
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
