use super::ErrorEnvelope;
use crate::errors::internal::{AuthFailure, DuplicateField, InternalError, ValidationErrors};
use poem_openapi::{payload::Json, ApiResponse};
use std::fmt;

/// Error responses for the /auth surface.
///
/// Login, signup and refresh failures are 400s with the uniform envelope;
/// bearer-token failures on protected endpoints are 401s.
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// Field-level validation failed
    #[oai(status = 400)]
    ValidationFailed(Json<ErrorEnvelope>),

    /// Unknown identifier or wrong password; one message for both
    #[oai(status = 400)]
    InvalidCredentials(Json<ErrorEnvelope>),

    /// is_active is false
    #[oai(status = 400)]
    AccountDisabled(Json<ErrorEnvelope>),

    /// Admin-deactivated; message carries the stored reason
    #[oai(status = 400)]
    AccountDeactivated(Json<ErrorEnvelope>),

    /// Not yet cleared by an admin
    #[oai(status = 400)]
    PendingApproval(Json<ErrorEnvelope>),

    /// No mobile-eligible role or role hint
    #[oai(status = 400)]
    NotAuthorizedForMobile(Json<ErrorEnvelope>),

    /// Refresh token unknown, revoked, or expired
    #[oai(status = 400)]
    InvalidRefresh(Json<ErrorEnvelope>),

    /// Invalid or malformed access token
    #[oai(status = 401)]
    InvalidToken(Json<ErrorEnvelope>),

    /// Access token has expired
    #[oai(status = 401)]
    ExpiredToken(Json<ErrorEnvelope>),

    /// Not found (profile lookups)
    #[oai(status = 404)]
    NotFound(Json<ErrorEnvelope>),

    /// Too many attempts
    #[oai(status = 429)]
    Throttled(Json<ErrorEnvelope>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<ErrorEnvelope>),
}

impl AuthError {
    pub fn validation_failed(errors: ValidationErrors) -> Self {
        AuthError::ValidationFailed(Json(ErrorEnvelope::with_errors(
            "Validation failed",
            errors.fields,
        )))
    }

    pub fn duplicate_field(field: DuplicateField) -> Self {
        AuthError::ValidationFailed(Json(ErrorEnvelope::with_errors(
            field.message(),
            ValidationErrors::single(field.field_name(), field.message()).fields,
        )))
    }

    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Json(ErrorEnvelope::message(
            "Invalid login credentials",
        )))
    }

    pub fn account_disabled() -> Self {
        AuthError::AccountDisabled(Json(ErrorEnvelope::message("This account is disabled")))
    }

    pub fn account_deactivated(reason: &str) -> Self {
        AuthError::AccountDeactivated(Json(ErrorEnvelope::message(format!(
            "Your account has been deactivated: {}",
            reason
        ))))
    }

    pub fn pending_approval() -> Self {
        AuthError::PendingApproval(Json(ErrorEnvelope::message(
            "Your account is awaiting admin approval",
        )))
    }

    pub fn not_authorized_for_mobile() -> Self {
        AuthError::NotAuthorizedForMobile(Json(ErrorEnvelope::message(
            "This account is not authorized to use the mobile app",
        )))
    }

    pub fn invalid_refresh() -> Self {
        AuthError::InvalidRefresh(Json(ErrorEnvelope::message("Invalid refresh token")))
    }

    pub fn invalid_token() -> Self {
        AuthError::InvalidToken(Json(ErrorEnvelope::message("Invalid or malformed token")))
    }

    pub fn expired_token() -> Self {
        AuthError::ExpiredToken(Json(ErrorEnvelope::message("Token has expired")))
    }

    pub fn not_found(message: &str) -> Self {
        AuthError::NotFound(Json(ErrorEnvelope::message(message)))
    }

    pub fn throttled() -> Self {
        AuthError::Throttled(Json(ErrorEnvelope::message(
            "Too many attempts, try again later",
        )))
    }

    fn internal_server_error() -> Self {
        AuthError::InternalError(Json(ErrorEnvelope::message("An internal error occurred")))
    }

    /// The single conversion point from domain errors to the /auth wire.
    /// Store internals are logged here and never leak to clients.
    pub fn from_internal(err: InternalError) -> Self {
        match err {
            InternalError::Validation(errors) => Self::validation_failed(errors),
            InternalError::Duplicate(field) => Self::duplicate_field(field),
            InternalError::Authentication(failure) => match failure {
                AuthFailure::InvalidCredentials => Self::invalid_credentials(),
                AuthFailure::AccountDisabled => Self::account_disabled(),
                AuthFailure::AccountDeactivated(reason) => Self::account_deactivated(&reason),
                AuthFailure::PendingApproval => Self::pending_approval(),
                AuthFailure::NotAuthorizedForMobile => Self::not_authorized_for_mobile(),
                AuthFailure::InvalidRefresh => Self::invalid_refresh(),
                AuthFailure::InvalidToken => Self::invalid_token(),
                AuthFailure::ExpiredToken => Self::expired_token(),
            },
            InternalError::NotFound(kind) => {
                Self::not_found(&format!("The requested {} was not found", kind.name()))
            }
            InternalError::Database(db_err) => {
                tracing::error!("Database error in auth operation: {}", db_err);
                Self::internal_server_error()
            }
            InternalError::Crypto { operation, message } => {
                tracing::error!("Crypto error in {}: {}", operation, message);
                Self::internal_server_error()
            }
            other => {
                tracing::error!("Unexpected error in auth operation: {}", other);
                Self::internal_server_error()
            }
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        match self {
            AuthError::ValidationFailed(json) => json.0.message.clone(),
            AuthError::InvalidCredentials(json) => json.0.message.clone(),
            AuthError::AccountDisabled(json) => json.0.message.clone(),
            AuthError::AccountDeactivated(json) => json.0.message.clone(),
            AuthError::PendingApproval(json) => json.0.message.clone(),
            AuthError::NotAuthorizedForMobile(json) => json.0.message.clone(),
            AuthError::InvalidRefresh(json) => json.0.message.clone(),
            AuthError::InvalidToken(json) => json.0.message.clone(),
            AuthError::ExpiredToken(json) => json.0.message.clone(),
            AuthError::NotFound(json) => json.0.message.clone(),
            AuthError::Throttled(json) => json.0.message.clone(),
            AuthError::InternalError(json) => json.0.message.clone(),
        }
    }
}

impl From<InternalError> for AuthError {
    fn from(err: InternalError) -> Self {
        Self::from_internal(err)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::AuthFailure;

    #[test]
    fn test_deactivation_message_carries_reason() {
        let err = AuthError::from_internal(InternalError::Authentication(
            AuthFailure::AccountDeactivated("disputed contract".to_string()),
        ));
        assert!(err.message().contains("disputed contract"));
        assert!(matches!(err, AuthError::AccountDeactivated(_)));
    }

    #[test]
    fn test_duplicate_maps_to_validation_envelope() {
        let err = AuthError::from_internal(InternalError::Duplicate(DuplicateField::Phone));
        match err {
            AuthError::ValidationFailed(json) => {
                let errors = json.0.errors.expect("errors map present");
                assert!(errors.contains_key("phone"));
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_database_error_is_opaque() {
        let err = AuthError::from_internal(InternalError::Database(sea_orm::DbErr::Custom(
            "secret table missing".to_string(),
        )));
        assert!(!err.message().contains("secret"));
        assert!(matches!(err, AuthError::InternalError(_)));
    }
}
