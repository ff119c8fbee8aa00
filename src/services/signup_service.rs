//! Registration and the approval workflow.

use crate::errors::internal::{DuplicateField, InternalError, ValidationErrors};
use crate::services::auth_service::{AuthService, TokenPair};
use crate::services::password_policy;
use crate::services::phone;
use crate::stores::credential_store;
use crate::stores::principal_store::{NewPrincipal, PrincipalStore};
use crate::stores::role_store::RoleStore;
use crate::types::db::user;
use crate::types::internal::system_role::RoleHint;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: String,
    pub role_hint: String,
}

pub struct SignupService {
    db: DatabaseConnection,
    principals: PrincipalStore,
    roles: RoleStore,
}

impl SignupService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            principals: PrincipalStore::new(db.clone()),
            roles: RoleStore::new(db.clone()),
            db,
        }
    }

    /// Mobile self-registration. Auto-approved; Principal, Profile, and
    /// the inferred RoleAssignment land in one transaction. The caller
    /// issues tokens afterwards so the client can proceed immediately.
    pub async fn signup(
        &self,
        input: SignupInput,
        auth: &AuthService,
    ) -> Result<(user::Model, TokenPair), InternalError> {
        let hint = self.validate(&input).await?;

        let password_hash = credential_store::hash_password(&input.password).await?;
        let role = self.roles.ensure_system_role(hint.target_role()).await?;

        let txn = self.db.begin().await?;
        let principal = self
            .principals
            .create_principal_with(
                &txn,
                NewPrincipal {
                    username: input.username.trim().to_string(),
                    email: input.email.trim().to_string(),
                    password_hash,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    phone: input.phone.trim().to_string(),
                    role_hint: hint.as_str().to_string(),
                    is_approved: true,
                    approved_by: None,
                    is_staff: false,
                    is_superuser: false,
                },
            )
            .await?;
        self.roles
            .assign_role_with(&txn, &principal.id, &role.id, None)
            .await?;
        txn.commit().await?;

        let pair = auth.issue_pair(&principal.id).await?;
        info!(user_id = %principal.id, role_hint = hint.as_str(), "signup completed");
        Ok((principal, pair))
    }

    /// Admin-driven owner creation. Same shape as signup, but the role
    /// assignment records the admin as assigner so the Manager
    /// provenance filter sees the new account, and approval is stamped
    /// with the admin's id.
    pub async fn register_owner(
        &self,
        mut input: SignupInput,
        admin_id: &str,
    ) -> Result<user::Model, InternalError> {
        input.role_hint = "owner".to_string();
        self.create_for_admin(input, admin_id).await
    }

    /// Admin-created account with the hint the admin chose; same
    /// provenance stamping as owner registration
    pub async fn create_for_admin(
        &self,
        input: SignupInput,
        admin_id: &str,
    ) -> Result<user::Model, InternalError> {
        let hint = self.validate(&input).await?;

        let password_hash = credential_store::hash_password(&input.password).await?;
        let role = self.roles.ensure_system_role(hint.target_role()).await?;

        let txn = self.db.begin().await?;
        let principal = self
            .principals
            .create_principal_with(
                &txn,
                NewPrincipal {
                    username: input.username.trim().to_string(),
                    email: input.email.trim().to_string(),
                    password_hash,
                    first_name: input.first_name,
                    last_name: input.last_name,
                    phone: input.phone.trim().to_string(),
                    role_hint: hint.as_str().to_string(),
                    is_approved: true,
                    approved_by: Some(admin_id.to_string()),
                    is_staff: false,
                    is_superuser: false,
                },
            )
            .await?;
        self.roles
            .assign_role_with(&txn, &principal.id, &role.id, Some(admin_id))
            .await?;
        txn.commit().await?;

        info!(user_id = %principal.id, admin_id = %admin_id, "account provisioned by admin");
        Ok(principal)
    }

    /// Field presence, then password match, then strength, then
    /// uniqueness of username, email, and phone, then phone format.
    /// The uniqueness lookups are advisory; the store's constraint
    /// mapping still catches the race where two signups pass the
    /// pre-check together.
    async fn validate(&self, input: &SignupInput) -> Result<RoleHint, InternalError> {
        let mut errors = ValidationErrors::new();

        if input.username.trim().is_empty() {
            errors.push("username", "Username is required.");
        }
        if input.email.trim().is_empty() {
            errors.push("email", "Email is required.");
        }
        if input.password.is_empty() {
            errors.push("password", "Password is required.");
        }
        if input.phone.trim().is_empty() {
            errors.push("phone", "Phone number is required.");
        }
        if !errors.is_empty() {
            return Err(InternalError::Validation(errors));
        }

        if input.password != input.confirm_password {
            errors.push("confirm_password", "Passwords do not match.");
            return Err(InternalError::Validation(errors));
        }

        password_policy::validate_into(&input.password, "password", &mut errors);
        if !errors.is_empty() {
            return Err(InternalError::Validation(errors));
        }

        if self
            .principals
            .find_by_username(input.username.trim())
            .await?
            .is_some()
        {
            return Err(InternalError::Duplicate(DuplicateField::Username));
        }
        if self.principals.find_by_email(input.email.trim()).await?.is_some() {
            return Err(InternalError::Duplicate(DuplicateField::Email));
        }
        if self.principals.find_by_phone(input.phone.trim()).await?.is_some() {
            return Err(InternalError::Duplicate(DuplicateField::Phone));
        }

        if !phone::is_valid(input.phone.trim()) {
            errors.push("phone", "Enter a valid phone number.");
            return Err(InternalError::Validation(errors));
        }

        RoleHint::parse(&input.role_hint).ok_or_else(|| {
            InternalError::Validation(ValidationErrors::single(
                "role_hint",
                "Account type must be tenant or owner.",
            ))
        })
    }
}
