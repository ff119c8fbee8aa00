use crate::api::BearerAuth;
use crate::app_data::AppData;
use crate::errors::api::AuthError;
use crate::errors::internal::ValidationErrors;
use crate::services::signup_service::SignupInput;
use crate::stores::principal_store::ProfileUpdate;
use crate::types::dto::auth::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LogoutRequest, ProfileResponse,
    RefreshRequest, RefreshResponse, SignupRequest, SignupResponse, TokenPairBody, TokenResponse,
    VerifyResponse,
};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::user::{UpdateUserRequest, UserSummary};
use poem::web::RemoteAddr;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Authentication and self-service endpoints
pub struct AuthApi {
    app: Arc<AppData>,
}

impl AuthApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }

    async fn bearer(&self, auth: &BearerAuth) -> Result<crate::types::db::user::Model, AuthError> {
        self.app
            .auth
            .verify(&auth.0.token)
            .await
            .map_err(AuthError::from_internal)
    }

    async fn summary(&self, user: &crate::types::db::user::Model) -> Result<UserSummary, AuthError> {
        let profile = self
            .app
            .principals
            .get_profile(&user.id)
            .await
            .map_err(AuthError::from_internal)?;
        Ok(UserSummary::from_models(user, &profile))
    }

    /// Rate-limit on the caller's address and, when known, the account
    /// being acted on. Rotating identifiers still exhausts the address
    /// window.
    fn check_throttle(&self, remote: &RemoteAddr, account_key: Option<&str>) -> Result<(), AuthError> {
        let addr_ok = self.app.auth_throttle.check(&format!("addr:{}", remote));
        let account_ok = match account_key {
            Some(key) => self.app.auth_throttle.check(key),
            None => true,
        };
        if !addr_ok || !account_ok {
            return Err(AuthError::throttled());
        }
        Ok(())
    }

    fn token_response(message: &str, pair: crate::services::auth_service::TokenPair, user: UserSummary) -> TokenResponse {
        TokenResponse {
            success: true,
            message: message.to_string(),
            status: if user.is_approved { "approved" } else { "pending" }.to_string(),
            tokens: TokenPairBody {
                access: pair.access_token.clone(),
                refresh: pair.refresh_token.clone(),
            },
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
            user,
        }
    }
}

#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Register a new tenant or owner account and receive tokens
    #[oai(path = "/signup", method = "post", tag = "AuthTags::Authentication")]
    async fn signup(
        &self,
        remote: &RemoteAddr,
        body: Json<SignupRequest>,
    ) -> Result<SignupResponse, AuthError> {
        self.check_throttle(remote, Some(&format!("signup:{}", body.email)))?;

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
        let (user, pair) = self
            .app
            .signup
            .signup(input, &self.app.auth)
            .await
            .map_err(AuthError::from_internal)?;

        let summary = self.summary(&user).await?;
        Ok(SignupResponse::Created(Json(Self::token_response(
            "Account created",
            pair,
            summary,
        ))))
    }

    /// Login with email or phone to receive authentication tokens
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        remote: &RemoteAddr,
        body: Json<LoginRequest>,
    ) -> Result<Json<TokenResponse>, AuthError> {
        let key = body.lookup_key().ok_or_else(|| {
            AuthError::validation_failed(ValidationErrors::single(
                "identifier",
                "Provide an email or phone number.",
            ))
        })?;
        self.check_throttle(remote, Some(&format!("login:{}", key)))?;

        let (user, pair) = self
            .app
            .auth
            .login(key, &body.password)
            .await
            .map_err(AuthError::from_internal)?;

        let summary = self.summary(&user).await?;
        Ok(Json(Self::token_response("Login successful", pair, summary)))
    }

    /// Exchange a refresh token for a new access + refresh pair
    #[oai(path = "/refresh", method = "post", tag = "AuthTags::Authentication")]
    async fn refresh(
        &self,
        remote: &RemoteAddr,
        body: Json<RefreshRequest>,
    ) -> Result<Json<RefreshResponse>, AuthError> {
        self.check_throttle(remote, None)?;

        let pair = self
            .app
            .auth
            .refresh(&body.refresh_token)
            .await
            .map_err(AuthError::from_internal)?;

        Ok(Json(RefreshResponse {
            success: true,
            message: "Token refreshed".to_string(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: pair.expires_in,
        }))
    }

    /// Revoke the presented refresh token
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(
        &self,
        remote: &RemoteAddr,
        body: Json<LogoutRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        self.check_throttle(remote, None)?;
        self.app
            .auth
            .logout(&body.refresh_token)
            .await
            .map_err(AuthError::from_internal)?;
        Ok(Json(MessageResponse::ok("Logged out")))
    }

    /// Confirm the access token is valid and return the bearer
    #[oai(path = "/verify", method = "get", tag = "AuthTags::Authentication")]
    async fn verify(&self, auth: BearerAuth) -> Result<Json<VerifyResponse>, AuthError> {
        let user = self.bearer(&auth).await?;
        Ok(Json(VerifyResponse {
            success: true,
            message: "Token is valid".to_string(),
            user_id: user.id,
            username: user.username,
        }))
    }

    /// Queue a password reset request for the admin pool. The response
    /// does not reveal whether the email is registered.
    #[oai(path = "/forgot-password", method = "post", tag = "AuthTags::Authentication")]
    async fn forgot_password(
        &self,
        remote: &RemoteAddr,
        body: Json<ForgotPasswordRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        self.check_throttle(remote, Some(&format!("forgot:{}", body.email)))?;

        self.app
            .auth
            .forgot_password(&body.email)
            .await
            .map_err(AuthError::from_internal)?;
        Ok(Json(MessageResponse::ok(
            "If that email is registered, an administrator has been notified",
        )))
    }

    /// Change the bearer's password; all other sessions are revoked
    #[oai(path = "/change-password", method = "post", tag = "AuthTags::Authentication")]
    async fn change_password(
        &self,
        auth: BearerAuth,
        body: Json<ChangePasswordRequest>,
    ) -> Result<Json<MessageResponse>, AuthError> {
        let user = self.bearer(&auth).await?;
        self.app
            .auth
            .change_password(
                &user.id,
                &body.current_password,
                &body.new_password,
                &body.confirm_password,
            )
            .await
            .map_err(AuthError::from_internal)?;
        Ok(Json(MessageResponse::ok("Password changed")))
    }

    /// The bearer's own account and profile
    #[oai(path = "/profile", method = "get", tag = "AuthTags::Authentication")]
    async fn profile(&self, auth: BearerAuth) -> Result<Json<ProfileResponse>, AuthError> {
        let user = self.bearer(&auth).await?;
        Ok(Json(ProfileResponse {
            success: true,
            message: "Profile".to_string(),
            user: self.summary(&user).await?,
        }))
    }

    /// Partial update of the bearer's own profile
    #[oai(path = "/profile/update", method = "post", tag = "AuthTags::Authentication")]
    async fn profile_update(
        &self,
        auth: BearerAuth,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<ProfileResponse>, AuthError> {
        let user = self.bearer(&auth).await?;
        if let Some(phone) = &body.0.phone {
            if !crate::services::phone::is_valid(phone.trim()) {
                return Err(AuthError::validation_failed(
                    crate::errors::internal::ValidationErrors::single(
                        "phone",
                        "Enter a valid phone number.",
                    ),
                ));
            }
        }
        self.app
            .principals
            .update_profile(
                &user.id,
                ProfileUpdate {
                    first_name: body.0.first_name,
                    last_name: body.0.last_name,
                    phone: body.0.phone,
                },
            )
            .await
            .map_err(AuthError::from_internal)?;

        let user = self
            .app
            .principals
            .get_by_id(&user.id)
            .await
            .map_err(AuthError::from_internal)?;
        Ok(Json(ProfileResponse {
            success: true,
            message: "Profile updated".to_string(),
            user: self.summary(&user).await?,
        }))
    }
}
