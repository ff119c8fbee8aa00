// API layer - HTTP endpoints
pub mod admin;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod roles;
pub mod users;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use health::HealthApi;
pub use notifications::NotificationsApi;
pub use roles::RolesApi;
pub use users::UsersApi;

use crate::app_data::AppData;
use crate::errors::api::AdminError;
use crate::errors::internal::{AuthzFailure, InternalError};
use crate::types::db::user;
use poem_openapi::auth::Bearer;
use poem_openapi::SecurityScheme;

/// JWT Bearer token authentication
#[derive(SecurityScheme)]
#[oai(
    ty = "bearer",
    key_name = "Authorization",
    key_in = "header",
    bearer_format = "JWT"
)]
pub struct BearerAuth(pub Bearer);

/// Resolve the bearer token to a principal, for the administrative
/// surfaces. Token failures become 401 here; capability checks come
/// after.
pub async fn bearer_principal(
    app: &AppData,
    auth: &BearerAuth,
) -> Result<user::Model, AdminError> {
    app.auth
        .verify(&auth.0.token)
        .await
        .map_err(AdminError::from_internal)
}

/// 403 unless the bearer is staff or superuser
pub fn require_privileged(principal: &user::Model) -> Result<(), AdminError> {
    if principal.is_staff || principal.is_superuser {
        return Ok(());
    }
    Err(AdminError::from_internal(InternalError::Authorization(
        AuthzFailure::SuperuserRequired,
    )))
}

/// 403 unless the principal holds the navigation capability
pub async fn require_nav(
    app: &AppData,
    principal: &user::Model,
    nav_name: &str,
) -> Result<(), AdminError> {
    if app
        .resolver
        .may(principal, nav_name)
        .await
        .map_err(AdminError::from_internal)?
    {
        return Ok(());
    }
    Err(AdminError::from_internal(InternalError::Authorization(
        AuthzFailure::MissingNavCapability(nav_name.to_string()),
    )))
}

/// 403 unless the principal holds the object permission
pub async fn require_perm(
    app: &AppData,
    principal: &user::Model,
    app_label: &str,
    codename: &str,
) -> Result<(), AdminError> {
    if app
        .resolver
        .may_obj(principal, app_label, codename)
        .await
        .map_err(AdminError::from_internal)?
    {
        return Ok(());
    }
    Err(AdminError::from_internal(InternalError::Authorization(
        AuthzFailure::MissingObjectPermission(format!("{}.{}", app_label, codename)),
    )))
}

/// 403 unless the target user is within the principal's visibility
/// scope (Manager provenance)
pub async fn require_in_scope(
    app: &AppData,
    principal: &user::Model,
    target_user_id: &str,
) -> Result<(), AdminError> {
    let scope = app
        .resolver
        .user_row_filter(principal)
        .await
        .map_err(AdminError::from_internal)?;
    let Some(scope) = scope else {
        return Ok(());
    };

    let visible = app
        .principals
        .search("", Some(scope))
        .await
        .map_err(AdminError::from_internal)?;
    if visible.iter().any(|u| u.id == target_user_id) {
        return Ok(());
    }
    Err(AdminError::from_internal(InternalError::Authorization(
        AuthzFailure::ManagerScopeViolation,
    )))
}
