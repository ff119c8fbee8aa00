use std::collections::HashMap;
use thiserror::Error;

/// Which unique field a write collided on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
    Phone,
    RoleName,
}

impl DuplicateField {
    pub fn field_name(&self) -> &'static str {
        match self {
            DuplicateField::Username => "username",
            DuplicateField::Email => "email",
            DuplicateField::Phone => "phone",
            DuplicateField::RoleName => "name",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DuplicateField::Username => "A user with this username already exists",
            DuplicateField::Email => "A user with this email already exists",
            DuplicateField::Phone => "A user with this phone number already exists",
            DuplicateField::RoleName => "A role with this name already exists",
        }
    }
}

/// Field-level validation failures, accumulated before any write
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    pub fields: HashMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Authentication failures surfaced to the login/refresh flows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// One message for unknown identifier and wrong password alike
    InvalidCredentials,
    AccountDisabled,
    /// Carries the admin-supplied reason verbatim
    AccountDeactivated(String),
    PendingApproval,
    NotAuthorizedForMobile,
    InvalidRefresh,
    InvalidToken,
    ExpiredToken,
}

/// Authorization denials; the resolver itself never raises these, the
/// HTTP edge translates a `false` answer into one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzFailure {
    MissingNavCapability(String),
    MissingObjectPermission(String),
    ManagerScopeViolation,
    SuperuserRequired,
    SelfActionForbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Principal,
    Role,
    Notification,
    NavigationItem,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Principal => "user",
            ResourceKind::Role => "role",
            ResourceKind::Notification => "notification",
            ResourceKind::NavigationItem => "navigation item",
        }
    }
}

/// Domain errors below the HTTP edge
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("validation failed")]
    Validation(ValidationErrors),

    #[error("duplicate {}", .0.field_name())]
    Duplicate(DuplicateField),

    #[error("authentication failed")]
    Authentication(AuthFailure),

    #[error("authorization denied")]
    Authorization(AuthzFailure),

    #[error("{} not found", .0.name())]
    NotFound(ResourceKind),

    #[error("crypto error in {operation}: {message}")]
    Crypto { operation: String, message: String },
}

impl InternalError {
    pub fn crypto(operation: &str, message: impl Into<String>) -> Self {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

/// Map a store-level unique-constraint violation onto the typed duplicate
/// error for the given field. Application pre-checks are advisory; the
/// constraint is the authority and races land here.
pub fn map_unique_violation(err: sea_orm::DbErr, field: DuplicateField) -> InternalError {
    if is_unique_violation(&err) {
        InternalError::Duplicate(field)
    } else {
        InternalError::Database(err)
    }
}

pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    let text = err.to_string();
    text.contains("UNIQUE") || text.contains("unique constraint")
}

/// Identify which unique column a constraint violation hit. Inserts that
/// touch several unique columns (users carry both username and the
/// normalized email) need the column name from the driver message.
pub fn classify_unique_violation(err: &sea_orm::DbErr) -> Option<DuplicateField> {
    if !is_unique_violation(err) {
        return None;
    }
    let text = err.to_string();
    if text.contains("users.username") {
        Some(DuplicateField::Username)
    } else if text.contains("users.email_normalized") {
        Some(DuplicateField::Email)
    } else if text.contains("profiles.phone") {
        Some(DuplicateField::Phone)
    } else if text.contains("roles.name") {
        Some(DuplicateField::RoleName)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_accumulate_per_field() {
        let mut errors = ValidationErrors::new();
        errors.push("password", "too short");
        errors.push("password", "needs a digit");
        errors.push("phone", "required");

        assert_eq!(errors.fields["password"].len(), 2);
        assert_eq!(errors.fields["phone"].len(), 1);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_unique_violation_mapping() {
        let db_err = sea_orm::DbErr::Custom("UNIQUE constraint failed: users.username".to_string());
        match map_unique_violation(db_err, DuplicateField::Username) {
            InternalError::Duplicate(DuplicateField::Username) => {}
            other => panic!("expected Duplicate(Username), got {:?}", other),
        }

        let db_err = sea_orm::DbErr::Custom("disk I/O error".to_string());
        match map_unique_violation(db_err, DuplicateField::Username) {
            InternalError::Database(_) => {}
            other => panic!("expected Database, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_unique_violation_by_column() {
        let err = sea_orm::DbErr::Custom("UNIQUE constraint failed: profiles.phone".to_string());
        assert_eq!(classify_unique_violation(&err), Some(DuplicateField::Phone));

        let err =
            sea_orm::DbErr::Custom("UNIQUE constraint failed: users.email_normalized".to_string());
        assert_eq!(classify_unique_violation(&err), Some(DuplicateField::Email));

        let err = sea_orm::DbErr::Custom("no such table: users".to_string());
        assert_eq!(classify_unique_violation(&err), None);
    }
}
