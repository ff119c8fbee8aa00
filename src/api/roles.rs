use crate::api::{bearer_principal, require_in_scope, require_perm, require_privileged, BearerAuth};
use crate::app_data::AppData;
use crate::errors::api::AdminError;
use crate::errors::internal::ValidationErrors;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::role::{
    CreateRoleRequest, RoleBody, RoleDetailResponse, RoleListResponse, SetRoleNavigationRequest,
    SetRolePermissionsRequest, SetUserRolesRequest, UpdateRoleRequest, UserRolesResponse,
};
use crate::types::internal::permission::ObjectPermission;
use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Role administration surface
pub struct RolesApi {
    app: Arc<AppData>,
}

impl RolesApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }

    async fn detail_response(
        &self,
        role_id: &str,
        message: &str,
    ) -> Result<Json<RoleDetailResponse>, AdminError> {
        let role = self
            .app
            .roles
            .get_role(role_id)
            .await
            .map_err(AdminError::from_internal)?;
        let permissions = self
            .app
            .roles
            .role_object_permissions(role_id)
            .await
            .map_err(AdminError::from_internal)?;
        let items = self
            .app
            .roles
            .role_navigation_items(role_id)
            .await
            .map_err(AdminError::from_internal)?;

        Ok(Json(RoleDetailResponse {
            success: true,
            message: message.to_string(),
            role: role.into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            navigation_items: items.into_iter().map(|i| i.name).collect(),
        }))
    }
}

#[derive(Tags)]
enum RoleTags {
    /// Role and capability administration
    Roles,
}

#[OpenApi(prefix_path = "/roles")]
impl RolesApi {
    /// All roles
    #[oai(path = "/", method = "get", tag = "RoleTags::Roles")]
    async fn list(&self, auth: BearerAuth) -> Result<Json<RoleListResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        let roles = self
            .app
            .roles
            .list_roles()
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(RoleListResponse {
            success: true,
            message: "Roles".to_string(),
            roles: roles.into_iter().map(RoleBody::from).collect(),
        }))
    }

    /// Create a custom role. Admin-named roles receive every permission
    /// and navigation item at creation.
    #[oai(path = "/create", method = "post", tag = "RoleTags::Roles")]
    async fn create(
        &self,
        auth: BearerAuth,
        body: Json<CreateRoleRequest>,
    ) -> Result<Json<RoleDetailResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        if body.name.trim().is_empty() {
            return Err(AdminError::validation_failed(ValidationErrors::single(
                "name",
                "Role name is required.",
            )));
        }

        let created = self
            .app
            .roles
            .create_role(body.name.trim(), body.description.as_deref())
            .await
            .map_err(AdminError::from_internal)?;
        self.detail_response(&created.id, "Role created").await
    }

    /// Role detail with its permission and navigation bindings
    #[oai(path = "/:role_id", method = "get", tag = "RoleTags::Roles")]
    async fn detail(
        &self,
        auth: BearerAuth,
        role_id: Path<String>,
    ) -> Result<Json<RoleDetailResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;
        self.detail_response(&role_id.0, "Role detail").await
    }

    /// Rename or re-describe a role
    #[oai(path = "/:role_id/update", method = "post", tag = "RoleTags::Roles")]
    async fn update(
        &self,
        auth: BearerAuth,
        role_id: Path<String>,
        body: Json<UpdateRoleRequest>,
    ) -> Result<Json<RoleDetailResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        self.app
            .roles
            .update_role(&role_id.0, body.0.name.as_deref(), body.0.description.as_deref())
            .await
            .map_err(AdminError::from_internal)?;
        self.detail_response(&role_id.0, "Role updated").await
    }

    /// Delete a custom role; its assignments cascade
    #[oai(path = "/:role_id/delete", method = "post", tag = "RoleTags::Roles")]
    async fn delete(
        &self,
        auth: BearerAuth,
        role_id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        self.app
            .roles
            .delete_role(&role_id.0)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(MessageResponse::ok("Role deleted")))
    }

    /// Replace the role's object permissions
    #[oai(path = "/:role_id/permissions", method = "post", tag = "RoleTags::Roles")]
    async fn set_permissions(
        &self,
        auth: BearerAuth,
        role_id: Path<String>,
        body: Json<SetRolePermissionsRequest>,
    ) -> Result<Json<RoleDetailResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        let mut perms = Vec::with_capacity(body.permissions.len());
        for raw in &body.permissions {
            match ObjectPermission::parse(raw) {
                Some(perm) => perms.push(perm),
                None => {
                    return Err(AdminError::validation_failed(ValidationErrors::single(
                        "permissions",
                        format!("'{}' is not of the form app_label.codename.", raw),
                    )))
                }
            }
        }

        self.app
            .roles
            .set_role_object_permissions(&role_id.0, &perms)
            .await
            .map_err(AdminError::from_internal)?;
        self.detail_response(&role_id.0, "Permissions updated").await
    }

    /// Replace the role's navigation items; implied permissions are
    /// granted alongside
    #[oai(path = "/:role_id/navigation", method = "post", tag = "RoleTags::Roles")]
    async fn set_navigation(
        &self,
        auth: BearerAuth,
        role_id: Path<String>,
        body: Json<SetRoleNavigationRequest>,
    ) -> Result<Json<RoleDetailResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        self.app
            .roles
            .set_role_navigation_items(&role_id.0, &body.navigation_items)
            .await
            .map_err(AdminError::from_internal)?;
        self.detail_response(&role_id.0, "Navigation updated").await
    }

    /// Roles held by a user
    #[oai(path = "/user/:user_id", method = "get", tag = "RoleTags::Roles")]
    async fn user_roles(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<UserRolesResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "view_user").await?;
        require_in_scope(&self.app, &principal, &user_id.0).await?;

        let roles = self
            .app
            .roles
            .list_principal_roles(&user_id.0)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(UserRolesResponse {
            success: true,
            message: "Held roles".to_string(),
            roles: roles.into_iter().map(RoleBody::from).collect(),
        }))
    }

    /// Replace the set of roles held by a user, by role name
    #[oai(path = "/user/:user_id/set", method = "post", tag = "RoleTags::Roles")]
    async fn set_user_roles(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
        body: Json<SetUserRolesRequest>,
    ) -> Result<Json<UserRolesResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "change_user").await?;
        require_in_scope(&self.app, &principal, &user_id.0).await?;

        // Resolve every name first so a typo leaves the set untouched
        let mut targets = Vec::with_capacity(body.roles.len());
        for name in &body.roles {
            let role = self
                .app
                .roles
                .find_role_by_name(name)
                .await
                .map_err(AdminError::from_internal)?
                .ok_or_else(|| AdminError::not_found(&format!("Unknown role '{}'", name)))?;
            targets.push(role);
        }

        let held = self
            .app
            .roles
            .list_principal_roles(&user_id.0)
            .await
            .map_err(AdminError::from_internal)?;
        for role in &held {
            if !targets.iter().any(|t| t.id == role.id) {
                self.app
                    .roles
                    .revoke_role(&user_id.0, &role.id)
                    .await
                    .map_err(AdminError::from_internal)?;
            }
        }
        for role in &targets {
            self.app
                .roles
                .assign_role(&user_id.0, &role.id, Some(&principal.id))
                .await
                .map_err(AdminError::from_internal)?;
        }

        let roles = self
            .app
            .roles
            .list_principal_roles(&user_id.0)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(UserRolesResponse {
            success: true,
            message: "Roles updated".to_string(),
            roles: roles.into_iter().map(RoleBody::from).collect(),
        }))
    }
}
