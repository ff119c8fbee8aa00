use crate::errors::internal::{AuthFailure, InternalError};
use crate::types::db::refresh_token::{self, Entity as RefreshToken};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use tracing::debug;

/// Password hashing and refresh-token persistence
pub struct CredentialStore {
    db: DatabaseConnection,
}

/// Argon2id hash of a password, PHC string format. Runs on the blocking
/// pool since hashing is tuned to take tens of milliseconds.
pub async fn hash_password(password: &str) -> Result<String, InternalError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| InternalError::Crypto {
                operation: "password hashing".to_string(),
                message: e.to_string(),
            })
    })
    .await
    .map_err(|e| InternalError::Crypto {
        operation: "password hashing".to_string(),
        message: e.to_string(),
    })?
}

/// Constant-time-ish verification against a stored PHC hash
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool, InternalError> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored_hash).map_err(|e| InternalError::Crypto {
            operation: "password hash parsing".to_string(),
            message: e.to_string(),
        })?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| InternalError::Crypto {
        operation: "password verification".to_string(),
        message: e.to_string(),
    })?
}

impl CredentialStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a freshly issued refresh token by its keyed hash
    pub async fn store_refresh_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        self.store_refresh_token_with(&self.db, user_id, token_hash, expires_at)
            .await
    }

    pub async fn store_refresh_token_with<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        token_hash: &str,
        expires_at: i64,
    ) -> Result<(), InternalError> {
        refresh_token::ActiveModel {
            token_hash: Set(token_hash.to_string()),
            user_id: Set(user_id.to_string()),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now().timestamp()),
            revoked: Set(false),
        }
        .insert(conn)
        .await?;
        Ok(())
    }

    /// Atomically consume a refresh token for rotation. The token is
    /// marked revoked by a conditional update keyed on `revoked = false`,
    /// so two concurrent presentations of the same token cannot both
    /// succeed. Returns the owning user id.
    pub async fn consume_refresh_token(&self, token_hash: &str) -> Result<String, InternalError> {
        let now = Utc::now().timestamp();

        let row = RefreshToken::find_by_id(token_hash)
            .one(&self.db)
            .await?
            .ok_or(InternalError::Authentication(AuthFailure::InvalidRefresh))?;

        if row.revoked {
            debug!(user_id = %row.user_id, "revoked refresh token presented");
            return Err(InternalError::Authentication(AuthFailure::InvalidRefresh));
        }
        if row.expires_at <= now {
            return Err(InternalError::Authentication(AuthFailure::InvalidRefresh));
        }

        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, sea_orm::sea_query::Expr::value(true))
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            // Lost the race to a concurrent rotation
            return Err(InternalError::Authentication(AuthFailure::InvalidRefresh));
        }

        Ok(row.user_id)
    }

    /// Revoke one token, such as on logout. Unknown tokens are ignored
    /// so logout stays idempotent.
    pub async fn revoke_refresh_token(&self, token_hash: &str) -> Result<(), InternalError> {
        RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, sea_orm::sea_query::Expr::value(true))
            .filter(refresh_token::Column::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Revoke every live token for a user. Used after a password change
    /// or an administrative reset.
    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64, InternalError> {
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, sea_orm::sea_query::Expr::value(true))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Delete expired and revoked rows; run periodically
    pub async fn purge_stale_tokens(&self) -> Result<u64, InternalError> {
        let now = Utc::now().timestamp();
        let result = RefreshToken::delete_many()
            .filter(
                sea_orm::Condition::any()
                    .add(refresh_token::Column::ExpiresAt.lte(now))
                    .add(refresh_token::Column::Revoked.eq(true)),
            )
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
