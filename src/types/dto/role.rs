use crate::types::db::role;
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// Wire view of a role
#[derive(Object, Debug, Serialize)]
pub struct RoleBody {
    pub id: String,
    pub name: String,
    pub description: Option<String>,

    /// Seeded well-known roles cannot be deleted
    pub is_system: bool,
}

impl From<role::Model> for RoleBody {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            is_system: model.is_system,
        }
    }
}

#[derive(Object, Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Object, Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Object, Debug)]
pub struct RoleListResponse {
    pub success: bool,
    pub message: String,
    pub roles: Vec<RoleBody>,
}

#[derive(Object, Debug)]
pub struct RoleDetailResponse {
    pub success: bool,
    pub message: String,
    pub role: RoleBody,

    /// "app_label.codename" strings
    pub permissions: Vec<String>,

    /// Navigation item names bound to the role
    pub navigation_items: Vec<String>,
}

/// Replace-set of "app_label.codename" strings
#[derive(Object, Debug, Deserialize)]
pub struct SetRolePermissionsRequest {
    pub permissions: Vec<String>,
}

/// Replace-set of navigation item names; granting an item also grants
/// its implied object permissions
#[derive(Object, Debug, Deserialize)]
pub struct SetRoleNavigationRequest {
    pub navigation_items: Vec<String>,
}

#[derive(Object, Debug)]
pub struct UserRolesResponse {
    pub success: bool,
    pub message: String,
    pub roles: Vec<RoleBody>,
}

/// Replace-set of role names for a principal
#[derive(Object, Debug, Deserialize)]
pub struct SetUserRolesRequest {
    pub roles: Vec<String>,
}
