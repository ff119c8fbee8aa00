use crate::api::{bearer_principal, require_in_scope, require_nav, require_perm, BearerAuth};
use crate::app_data::AppData;
use crate::errors::api::AdminError;
use crate::errors::internal::ValidationErrors;
use crate::services::signup_service::SignupInput;
use crate::stores::principal_store::ProfileUpdate;
use crate::types::dto::auth::SignupRequest;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::user::{
    ToggleApprovalResponse, ToggleStatusResponse, UpdateUserRequest, UserDetailResponse,
    UserListResponse, UserSummary,
};
use poem_openapi::param::{Path, Query};
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Administrative user management surface
pub struct UsersApi {
    app: Arc<AppData>,
}

impl UsersApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }

    async fn detail_response(
        &self,
        user_id: &str,
        message: &str,
    ) -> Result<Json<UserDetailResponse>, AdminError> {
        let user = self
            .app
            .principals
            .get_by_id(user_id)
            .await
            .map_err(AdminError::from_internal)?;
        let profile = self
            .app
            .principals
            .get_profile(user_id)
            .await
            .map_err(AdminError::from_internal)?;
        let roles = self
            .app
            .roles
            .list_principal_roles(user_id)
            .await
            .map_err(AdminError::from_internal)?;

        Ok(Json(UserDetailResponse {
            success: true,
            message: message.to_string(),
            user: UserSummary::from_models(&user, &profile),
            roles: roles.into_iter().map(|r| r.name).collect(),
        }))
    }
}

#[derive(Tags)]
enum UserTags {
    /// User administration
    Users,
}

#[OpenApi(prefix_path = "/users")]
impl UsersApi {
    /// Search users by username, email, or name fragment
    #[oai(path = "/search", method = "get", tag = "UserTags::Users")]
    async fn search(
        &self,
        auth: BearerAuth,
        q: Query<Option<String>>,
    ) -> Result<Json<UserListResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_nav(&self.app, &principal, "user_list").await?;
        if !self.app.search_throttle.check(&format!("user-search:{}", principal.id)) {
            return Err(AdminError::throttled());
        }

        let scope = self
            .app
            .resolver
            .user_row_filter(&principal)
            .await
            .map_err(AdminError::from_internal)?;
        let found = self
            .app
            .principals
            .search(q.0.as_deref().unwrap_or(""), scope)
            .await
            .map_err(AdminError::from_internal)?;

        let mut users = Vec::with_capacity(found.len());
        for user in &found {
            let profile = self
                .app
                .principals
                .get_profile(&user.id)
                .await
                .map_err(AdminError::from_internal)?;
            users.push(UserSummary::from_models(user, &profile));
        }

        Ok(Json(UserListResponse {
            success: true,
            message: "Search results".to_string(),
            users,
        }))
    }

    /// Full detail for one user, including held roles
    #[oai(path = "/:user_id", method = "get", tag = "UserTags::Users")]
    async fn detail(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<UserDetailResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "view_user").await?;
        require_in_scope(&self.app, &principal, &user_id.0).await?;
        self.detail_response(&user_id.0, "User detail").await
    }

    /// Partial update of a user's profile fields
    #[oai(path = "/:user_id/update", method = "post", tag = "UserTags::Users")]
    async fn update(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserDetailResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "change_user").await?;
        require_in_scope(&self.app, &principal, &user_id.0).await?;

        if let Some(phone) = &body.0.phone {
            if !crate::services::phone::is_valid(phone.trim()) {
                return Err(AdminError::validation_failed(ValidationErrors::single(
                    "phone",
                    "Enter a valid phone number.",
                )));
            }
        }

        self.app
            .principals
            .update_profile(
                &user_id.0,
                ProfileUpdate {
                    first_name: body.0.first_name,
                    last_name: body.0.last_name,
                    phone: body.0.phone,
                },
            )
            .await
            .map_err(AdminError::from_internal)?;
        self.detail_response(&user_id.0, "User updated").await
    }

    /// Flip the active flag; a disabled user cannot log in
    #[oai(path = "/:user_id/toggle-status", method = "post", tag = "UserTags::Users")]
    async fn toggle_status(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<ToggleStatusResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "change_user").await?;
        if principal.id == user_id.0 {
            return Err(AdminError::self_action_forbidden());
        }
        require_in_scope(&self.app, &principal, &user_id.0).await?;

        let is_active = self
            .app
            .principals
            .toggle_active(&user_id.0)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(ToggleStatusResponse {
            success: true,
            message: if is_active { "Account enabled" } else { "Account disabled" }.to_string(),
            is_active,
        }))
    }

    /// Flip the approval flag
    #[oai(path = "/:user_id/toggle-approval", method = "post", tag = "UserTags::Users")]
    async fn toggle_approval(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<ToggleApprovalResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "change_user").await?;
        if principal.id == user_id.0 {
            return Err(AdminError::self_action_forbidden());
        }
        require_in_scope(&self.app, &principal, &user_id.0).await?;

        let is_approved = self
            .app
            .principals
            .toggle_approval(&user_id.0, &principal.id)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(ToggleApprovalResponse {
            success: true,
            message: if is_approved { "Account approved" } else { "Approval revoked" }.to_string(),
            is_approved,
        }))
    }

    /// Reset the user's password to the configured default and revoke
    /// their sessions
    #[oai(path = "/:user_id/reset-password", method = "post", tag = "UserTags::Users")]
    async fn reset_password(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "change_user").await?;
        require_in_scope(&self.app, &principal, &user_id.0).await?;

        self.app
            .auth
            .admin_reset_password(&user_id.0, &principal.id)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(MessageResponse::ok("Password reset to the default")))
    }

    /// Delete a user; profile, assignments, and sessions cascade
    #[oai(path = "/:user_id/delete", method = "post", tag = "UserTags::Users")]
    async fn delete(
        &self,
        auth: BearerAuth,
        user_id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "delete_user").await?;
        if principal.id == user_id.0 {
            return Err(AdminError::self_action_forbidden());
        }
        require_in_scope(&self.app, &principal, &user_id.0).await?;

        self.app
            .principals
            .reject(&user_id.0)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(MessageResponse::ok("Account deleted")))
    }

    /// Create an account directly, pre-approved
    #[oai(path = "/create", method = "post", tag = "UserTags::Users")]
    async fn create(
        &self,
        auth: BearerAuth,
        body: Json<SignupRequest>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "add_user").await?;

        let role_hint = body.0.role_hint.clone();
        let input = SignupInput {
            username: body.0.username,
            email: body.0.email,
            password: body.0.password,
            confirm_password: body.0.confirm_password,
            first_name: body.0.first_name,
            last_name: body.0.last_name,
            phone: body.0.phone,
            role_hint,
        };
        let created = self
            .app
            .signup
            .create_for_admin(input, &principal.id)
            .await
            .map_err(AdminError::from_internal)?;

        Ok(Json(MessageResponse::ok(format!(
            "Account '{}' created",
            created.username
        ))))
    }
}
