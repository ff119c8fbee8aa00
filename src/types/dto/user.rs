use crate::types::db::{profile, user};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Wire view of a principal and their profile
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: String,

    /// Self-declared account type ("tenant" or "owner")
    pub role_hint: String,
    pub is_active: bool,
    pub is_approved: bool,
    pub is_deactivated: bool,
    pub deactivation_reason: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,

    /// Unix timestamp
    pub created_at: i64,
}

impl UserSummary {
    pub fn from_models(user: &user::Model, profile: &profile::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: profile.phone.clone(),
            role_hint: profile.role_hint.clone(),
            is_active: user.is_active,
            is_approved: profile.is_approved,
            is_deactivated: profile.is_deactivated,
            deactivation_reason: profile.deactivation_reason.clone(),
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created_at: user.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct UserListResponse {
    pub success: bool,
    pub message: String,
    pub users: Vec<UserSummary>,
}

#[derive(Object, Debug)]
pub struct UserDetailResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,

    /// Names of the roles the principal holds
    pub roles: Vec<String>,
}

/// Partial profile update; absent fields are left unchanged
#[derive(Object, Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

/// Approve or reject a pending account
#[derive(Object, Debug, Deserialize)]
pub struct ApproveUserRequest {
    pub user_id: String,

    /// "approve" or "reject"
    pub action: String,
}

/// Flip an owner between active and deactivated
#[derive(Object, Debug, Deserialize)]
pub struct ActivateDeactivateRequest {
    pub user_id: String,

    /// Required when deactivating; shown to the owner at next login
    pub reason: Option<String>,
}

#[derive(Object, Debug)]
pub struct ToggleStatusResponse {
    pub success: bool,
    pub message: String,
    pub is_active: bool,
}

#[derive(Object, Debug)]
pub struct ToggleApprovalResponse {
    pub success: bool,
    pub message: String,
    pub is_approved: bool,
}
