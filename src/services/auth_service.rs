//! Credential and session layer: login guards, token rotation, and the
//! password flows.

use crate::errors::internal::{AuthFailure, InternalError, ValidationErrors};
use crate::services::password_policy;
use crate::services::token_service::TokenService;
use crate::stores::credential_store::{self, CredentialStore};
use crate::stores::notification_store::NotificationStore;
use crate::stores::principal_store::PrincipalStore;
use crate::stores::role_store::RoleStore;
use crate::types::db::user;
use crate::types::internal::system_role::SystemRole;
use sea_orm::DatabaseConnection;
use tracing::info;

/// Access + refresh pair handed to the client on login, signup, refresh
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

pub struct AuthService {
    principals: PrincipalStore,
    roles: RoleStore,
    credentials: CredentialStore,
    notifications: NotificationStore,
    tokens: TokenService,
    default_reset_password: String,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, tokens: TokenService, default_reset_password: String) -> Self {
        Self {
            principals: PrincipalStore::new(db.clone()),
            roles: RoleStore::new(db.clone()),
            credentials: CredentialStore::new(db.clone()),
            notifications: NotificationStore::new(db),
            tokens,
            default_reset_password,
        }
    }

    /// Login with email or phone. The guard chain runs in a fixed order
    /// so a caller learns nothing about which guard tripped beyond the
    /// returned failure itself.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(user::Model, TokenPair), InternalError> {
        let found = if identifier.contains('@') {
            self.principals.find_by_email(identifier).await?
        } else {
            self.principals.find_by_phone(identifier).await?
        };

        // Verify against a throwaway hash when the principal is unknown
        // to keep the timing profile flat
        let principal = match found {
            Some(p) => p,
            None => {
                let _ = credential_store::verify_password(password, DUMMY_HASH).await;
                return Err(InternalError::Authentication(AuthFailure::InvalidCredentials));
            }
        };

        if !credential_store::verify_password(password, &principal.password_hash).await? {
            return Err(InternalError::Authentication(AuthFailure::InvalidCredentials));
        }

        if !principal.is_active {
            return Err(InternalError::Authentication(AuthFailure::AccountDisabled));
        }

        let profile = self.principals.get_profile(&principal.id).await?;
        if profile.is_deactivated {
            let reason = profile
                .deactivation_reason
                .clone()
                .unwrap_or_else(|| "No reason recorded.".to_string());
            return Err(InternalError::Authentication(AuthFailure::AccountDeactivated(reason)));
        }

        let privileged = principal.is_staff || principal.is_superuser;
        if !profile.is_approved && !privileged {
            return Err(InternalError::Authentication(AuthFailure::PendingApproval));
        }

        if !privileged && !self.holds_mobile_role(&principal.id, &profile.role_hint).await? {
            return Err(InternalError::Authentication(AuthFailure::NotAuthorizedForMobile));
        }

        let pair = self.issue_pair(&principal.id).await?;
        info!(user_id = %principal.id, "login succeeded");
        Ok((principal, pair))
    }

    /// Rotate a refresh token: the presented token is consumed and a new
    /// access + refresh pair is issued. Single-use is enforced by the
    /// store's conditional update.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, InternalError> {
        let hash = self.tokens.hash_refresh_token(refresh_token);
        let user_id = self.credentials.consume_refresh_token(&hash).await?;

        // The account state may have changed since login
        let principal = self.principals.get_by_id(&user_id).await.map_err(|_| {
            InternalError::Authentication(AuthFailure::InvalidRefresh)
        })?;
        if !principal.is_active {
            return Err(InternalError::Authentication(AuthFailure::InvalidRefresh));
        }
        let profile = self.principals.get_profile(&user_id).await?;
        if profile.is_deactivated {
            return Err(InternalError::Authentication(AuthFailure::InvalidRefresh));
        }

        self.issue_pair(&user_id).await
    }

    /// Revoke the presented refresh token; unknown tokens are a no-op.
    /// Logout doubles as the purge point for stale token rows.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), InternalError> {
        let hash = self.tokens.hash_refresh_token(refresh_token);
        self.credentials.revoke_refresh_token(&hash).await?;
        let purged = self.credentials.purge_stale_tokens().await?;
        if purged > 0 {
            info!(purged, "stale refresh tokens purged");
        }
        Ok(())
    }

    /// Confirm the access token and return the bearer
    pub async fn verify(&self, access_token: &str) -> Result<user::Model, InternalError> {
        let claims = self.tokens.validate_access_token(access_token)?;
        self.principals
            .get_by_id(&claims.sub)
            .await
            .map_err(|_| InternalError::Authentication(AuthFailure::InvalidToken))
    }

    /// Change the bearer's password. Every outstanding refresh token is
    /// revoked so stolen sessions die with the old password.
    pub async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), InternalError> {
        let principal = self.principals.get_by_id(user_id).await?;

        if !credential_store::verify_password(current_password, &principal.password_hash).await? {
            return Err(InternalError::Validation(ValidationErrors::single(
                "current_password",
                "Current password is incorrect.",
            )));
        }

        let mut errors = ValidationErrors::new();
        if new_password != confirm_password {
            errors.push("confirm_password", "Passwords do not match.");
        }
        password_policy::validate_into(new_password, "new_password", &mut errors);
        if !errors.is_empty() {
            return Err(InternalError::Validation(errors));
        }

        let hash = credential_store::hash_password(new_password).await?;
        self.principals.set_password_hash(user_id, hash).await?;
        let revoked = self.credentials.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "password changed, sessions revoked");
        Ok(())
    }

    /// Queue a reset request for the admin pool. The response is the
    /// same whether or not the email matches a principal.
    pub async fn forgot_password(&self, email: &str) -> Result<(), InternalError> {
        if let Some(principal) = self.principals.find_by_email(email).await? {
            let profile = self.principals.get_profile(&principal.id).await?;
            let metadata = serde_json::json!({
                "email": principal.email,
                "phone": profile.phone,
                "role_hint": profile.role_hint,
            })
            .to_string();
            self.notifications
                .create_reset_request(&principal.id, &principal.username, Some(metadata))
                .await?;
            info!(user_id = %principal.id, "reset request queued");
        }
        Ok(())
    }

    /// Admin-driven reset to the configured default password. Revokes
    /// the principal's sessions and records a pre-read follow-up.
    pub async fn admin_reset_password(
        &self,
        user_id: &str,
        admin_id: &str,
    ) -> Result<(), InternalError> {
        let principal = self.principals.get_by_id(user_id).await?;
        let hash = credential_store::hash_password(&self.default_reset_password).await?;
        self.principals.set_password_hash(user_id, hash).await?;
        self.credentials.revoke_all_for_user(user_id).await?;
        self.notifications
            .record_reset_completed(user_id, &principal.username, admin_id)
            .await?;
        info!(user_id = %user_id, admin_id = %admin_id, "password reset to default");
        Ok(())
    }

    /// Issue a fresh access + refresh pair and record the refresh hash
    pub async fn issue_pair(&self, user_id: &str) -> Result<TokenPair, InternalError> {
        let access_token = self.tokens.issue_access_token(user_id)?;
        let refresh_token = self.tokens.generate_refresh_token();
        let hash = self.tokens.hash_refresh_token(&refresh_token);
        self.credentials
            .store_refresh_token(user_id, &hash, self.tokens.refresh_expiration())
            .await?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.tokens.access_ttl_seconds(),
        })
    }

    /// Mobile login requires one of the serviced roles, by assignment or
    /// by profile hint
    async fn holds_mobile_role(
        &self,
        user_id: &str,
        role_hint: &str,
    ) -> Result<bool, InternalError> {
        if matches!(role_hint, "tenant" | "owner") {
            return Ok(true);
        }
        for role in [SystemRole::Tenant, SystemRole::PropertyOwner, SystemRole::Manager] {
            if self.roles.has_system_role(user_id, role).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

// Argon2id hash of an unguessable throwaway value, used to equalize the
// unknown-identifier path
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$3QA3x1J9fsmCb0UYvrKq64rAVzeBPxji7yXi5g4YpLM";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::principal_store::NewPrincipal;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> (AuthService, PrincipalStore, DatabaseConnection) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");
        let tokens = TokenService::new("test-jwt-secret", "test-refresh-secret", 15, 30);
        let service = AuthService::new(db.clone(), tokens, "Default123".to_string());
        (service, PrincipalStore::new(db.clone()), db)
    }

    async fn seed_user(principals: &PrincipalStore, username: &str, approved: bool) -> user::Model {
        let hash = credential_store::hash_password("Str0ngPass").await.unwrap();
        principals
            .create_principal(NewPrincipal {
                username: username.to_string(),
                email: format!("{}@x.io", username),
                password_hash: hash,
                first_name: None,
                last_name: None,
                phone: format!("+25571{:07}", username.len() * 98_765 % 10_000_000),
                role_hint: "tenant".to_string(),
                is_approved: approved,
                approved_by: None,
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_by_email_and_phone() {
        let (service, principals, _db) = setup().await;
        let user = seed_user(&principals, "amina", true).await;
        let profile = principals.get_profile(&user.id).await.unwrap();

        let (found, pair) = service.login("Amina@X.io", "Str0ngPass").await.unwrap();
        assert_eq!(found.id, user.id);
        assert!(pair.expires_in > 0);

        // Same account via phone, without the leading plus
        let stripped = profile.phone.trim_start_matches('+');
        let (found, _) = service.login(stripped, "Str0ngPass").await.unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_alike() {
        let (service, principals, _db) = setup().await;
        seed_user(&principals, "amina", true).await;

        let wrong = service.login("amina@x.io", "WrongPass1").await;
        let unknown = service.login("ghost@x.io", "WrongPass1").await;
        assert!(matches!(
            wrong,
            Err(InternalError::Authentication(AuthFailure::InvalidCredentials))
        ));
        assert!(matches!(
            unknown,
            Err(InternalError::Authentication(AuthFailure::InvalidCredentials))
        ));
    }

    #[tokio::test]
    async fn test_deactivated_login_carries_reason() {
        let (service, principals, _db) = setup().await;
        let user = seed_user(&principals, "amina", true).await;
        principals
            .deactivate(&user.id, "Unpaid dues", "admin-1")
            .await
            .unwrap();

        match service.login("amina@x.io", "Str0ngPass").await {
            Err(InternalError::Authentication(AuthFailure::AccountDeactivated(reason))) => {
                assert_eq!(reason, "Unpaid dues");
            }
            other => panic!("expected AccountDeactivated, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_unapproved_login_is_pending() {
        let (service, principals, _db) = setup().await;
        seed_user(&principals, "amina", false).await;
        assert!(matches!(
            service.login("amina@x.io", "Str0ngPass").await,
            Err(InternalError::Authentication(AuthFailure::PendingApproval))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rotation_is_single_use() {
        let (service, principals, _db) = setup().await;
        seed_user(&principals, "amina", true).await;
        let (_, pair) = service.login("amina@x.io", "Str0ngPass").await.unwrap();

        let rotated = service.refresh(&pair.refresh_token).await.unwrap();
        assert_ne!(rotated.refresh_token, pair.refresh_token);

        // The consumed token is dead
        assert!(matches!(
            service.refresh(&pair.refresh_token).await,
            Err(InternalError::Authentication(AuthFailure::InvalidRefresh))
        ));
        // The rotated one works
        service.refresh(&rotated.refresh_token).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_then_refresh_fails() {
        let (service, principals, _db) = setup().await;
        seed_user(&principals, "amina", true).await;
        let (_, pair) = service.login("amina@x.io", "Str0ngPass").await.unwrap();

        service.logout(&pair.refresh_token).await.unwrap();
        service.logout(&pair.refresh_token).await.unwrap();
        assert!(service.refresh(&pair.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn test_verify_returns_bearer() {
        let (service, principals, _db) = setup().await;
        let user = seed_user(&principals, "amina", true).await;
        let (_, pair) = service.login("amina@x.io", "Str0ngPass").await.unwrap();

        let bearer = service.verify(&pair.access_token).await.unwrap();
        assert_eq!(bearer.id, user.id);
        assert!(service.verify("not-a-jwt").await.is_err());
    }

    #[tokio::test]
    async fn test_change_password_revokes_sessions() {
        let (service, principals, _db) = setup().await;
        let user = seed_user(&principals, "amina", true).await;
        let (_, pair) = service.login("amina@x.io", "Str0ngPass").await.unwrap();

        service
            .change_password(&user.id, "Str0ngPass", "N3wStrongPass", "N3wStrongPass")
            .await
            .unwrap();

        assert!(service.refresh(&pair.refresh_token).await.is_err());
        assert!(service.login("amina@x.io", "Str0ngPass").await.is_err());
        service.login("amina@x.io", "N3wStrongPass").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_validates_new_password() {
        let (service, principals, _db) = setup().await;
        let user = seed_user(&principals, "amina", true).await;

        let mismatch = service
            .change_password(&user.id, "Str0ngPass", "N3wStrongPass", "Different1")
            .await;
        assert!(matches!(mismatch, Err(InternalError::Validation(_))));

        let weak = service
            .change_password(&user.id, "Str0ngPass", "short", "short")
            .await;
        assert!(matches!(weak, Err(InternalError::Validation(_))));
    }

    #[tokio::test]
    async fn test_forgot_password_never_enumerates() {
        let (service, principals, db) = setup().await;
        seed_user(&principals, "amina", true).await;

        service.forgot_password("amina@x.io").await.unwrap();
        service.forgot_password("ghost@x.io").await.unwrap();

        let notifications = NotificationStore::new(db);
        assert_eq!(notifications.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_reset_sets_default_and_records_follow_up() {
        let (service, principals, db) = setup().await;
        let user = seed_user(&principals, "amina", true).await;
        let (_, pair) = service.login("amina@x.io", "Str0ngPass").await.unwrap();

        service.admin_reset_password(&user.id, "admin-1").await.unwrap();

        assert!(service.refresh(&pair.refresh_token).await.is_err());
        service.login("amina@x.io", "Default123").await.unwrap();

        let notifications = NotificationStore::new(db);
        assert_eq!(notifications.unread_count().await.unwrap(), 0);
        assert_eq!(notifications.list().await.unwrap().len(), 1);
    }
}
