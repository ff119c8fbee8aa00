use crate::api::{bearer_principal, require_in_scope, require_perm, BearerAuth};
use crate::app_data::AppData;
use crate::errors::api::AdminError;
use crate::errors::internal::ValidationErrors;
use crate::services::signup_service::SignupInput;
use crate::types::dto::auth::SignupRequest;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::user::{
    ActivateDeactivateRequest, ApproveUserRequest, UserListResponse, UserSummary,
};
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Administrative account workflow endpoints
pub struct AdminApi {
    app: Arc<AppData>,
}

impl AdminApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[derive(Tags)]
enum AdminTags {
    /// Account approval and owner administration
    Administration,
}

#[OpenApi(prefix_path = "/admin")]
impl AdminApi {
    /// Accounts awaiting approval
    #[oai(path = "/pending-users", method = "get", tag = "AdminTags::Administration")]
    async fn pending_users(&self, auth: BearerAuth) -> Result<Json<UserListResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "view_user").await?;

        let pending = self
            .app
            .principals
            .list_pending()
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(UserListResponse {
            success: true,
            message: "Pending accounts".to_string(),
            users: pending
                .iter()
                .map(|(u, p)| UserSummary::from_models(u, p))
                .collect(),
        }))
    }

    /// Approve or reject a pending account. Reject deletes it.
    #[oai(path = "/approve-user", method = "post", tag = "AdminTags::Administration")]
    async fn approve_user(
        &self,
        auth: BearerAuth,
        body: Json<ApproveUserRequest>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "change_user").await?;

        match body.action.as_str() {
            "approve" => {
                self.app
                    .principals
                    .approve(&body.user_id, &principal.id)
                    .await
                    .map_err(AdminError::from_internal)?;
                Ok(Json(MessageResponse::ok("Account approved")))
            }
            "reject" => {
                self.app
                    .principals
                    .reject(&body.user_id)
                    .await
                    .map_err(AdminError::from_internal)?;
                Ok(Json(MessageResponse::ok("Account rejected and removed")))
            }
            other => Err(AdminError::validation_failed(ValidationErrors::single(
                "action",
                format!("Unknown action '{}', expected approve or reject.", other),
            ))),
        }
    }

    /// Create an owner account on a customer's behalf. The new account
    /// is approved immediately and attributed to the acting admin.
    #[oai(path = "/register-owner", method = "post", tag = "AdminTags::Administration")]
    async fn register_owner(
        &self,
        auth: BearerAuth,
        body: Json<SignupRequest>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "add_user").await?;

        let input = SignupInput {
            username: body.0.username,
            email: body.0.email,
            password: body.0.password,
            confirm_password: body.0.confirm_password,
            first_name: body.0.first_name,
            last_name: body.0.last_name,
            phone: body.0.phone,
            role_hint: body.0.role_hint,
        };
        let owner = self
            .app
            .signup
            .register_owner(input, &principal.id)
            .await
            .map_err(AdminError::from_internal)?;

        Ok(Json(MessageResponse::ok(format!(
            "Owner account '{}' created",
            owner.username
        ))))
    }

    /// Owner accounts, scoped by Manager provenance where it applies
    #[oai(path = "/list-owners", method = "get", tag = "AdminTags::Administration")]
    async fn list_owners(&self, auth: BearerAuth) -> Result<Json<UserListResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "view_user").await?;

        let scope = self
            .app
            .resolver
            .user_row_filter(&principal)
            .await
            .map_err(AdminError::from_internal)?;
        let visible_ids: Option<Vec<String>> = match scope {
            Some(scope) => Some(
                self.app
                    .principals
                    .search("", Some(scope))
                    .await
                    .map_err(AdminError::from_internal)?
                    .into_iter()
                    .map(|u| u.id)
                    .collect(),
            ),
            None => None,
        };

        let owners = self
            .app
            .principals
            .list_owners()
            .await
            .map_err(AdminError::from_internal)?;
        let users = owners
            .iter()
            .filter(|(u, _)| match &visible_ids {
                Some(ids) => ids.contains(&u.id),
                None => true,
            })
            .map(|(u, p)| UserSummary::from_models(u, p))
            .collect();

        Ok(Json(UserListResponse {
            success: true,
            message: "Owner accounts".to_string(),
            users,
        }))
    }

    /// Deactivate an owner with a reason, or reactivate them
    #[oai(
        path = "/activate-deactivate-owner",
        method = "post",
        tag = "AdminTags::Administration"
    )]
    async fn activate_deactivate_owner(
        &self,
        auth: BearerAuth,
        body: Json<ActivateDeactivateRequest>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_perm(&self.app, &principal, "accounts", "change_user").await?;
        if principal.id == body.user_id {
            return Err(AdminError::self_action_forbidden());
        }
        require_in_scope(&self.app, &principal, &body.user_id).await?;

        let profile = self
            .app
            .principals
            .get_profile(&body.user_id)
            .await
            .map_err(AdminError::from_internal)?;

        if profile.is_deactivated {
            self.app
                .principals
                .activate(&body.user_id, &principal.id)
                .await
                .map_err(AdminError::from_internal)?;
            Ok(Json(MessageResponse::ok("Account reactivated")))
        } else {
            let reason = body.0.reason.clone().filter(|r| !r.trim().is_empty()).ok_or_else(
                || {
                    AdminError::validation_failed(ValidationErrors::single(
                        "reason",
                        "A reason is required when deactivating an account.",
                    ))
                },
            )?;
            self.app
                .principals
                .deactivate(&body.user_id, &reason, &principal.id)
                .await
                .map_err(AdminError::from_internal)?;
            Ok(Json(MessageResponse::ok("Account deactivated")))
        }
    }
}
