use crate::errors::internal::{AuthFailure, InternalError};
use crate::services::crypto;
use crate::types::internal::auth::Claims;
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::prelude::*;
use std::fmt;

/// Issues and validates access tokens, generates opaque refresh tokens,
/// and hashes refresh tokens for server-side storage.
pub struct TokenService {
    jwt_secret: String,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
    refresh_token_secret: String,
}

impl TokenService {
    pub fn new(
        jwt_secret: impl Into<String>,
        refresh_token_secret: impl Into<String>,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
    ) -> Self {
        // Access tokens are capped at one hour
        let access_ttl_minutes = access_ttl_minutes.clamp(1, 60);
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl_minutes,
            refresh_ttl_days,
            refresh_token_secret: refresh_token_secret.into(),
        }
    }

    /// Issue an HS256 access token for the given principal
    pub fn issue_access_token(&self, user_id: &str) -> Result<String, InternalError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: now + self.access_ttl_minutes * 60,
            iat: now,
            token_type: "access".to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| InternalError::crypto("jwt_encode", e.to_string()))
    }

    /// Validate an access token and return its claims
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, InternalError> {
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            if matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
            ) {
                InternalError::Authentication(AuthFailure::ExpiredToken)
            } else {
                InternalError::Authentication(AuthFailure::InvalidToken)
            }
        })?;

        if token_data.claims.token_type != "access" {
            return Err(InternalError::Authentication(AuthFailure::InvalidToken));
        }

        Ok(token_data.claims)
    }

    /// Generate an opaque refresh token: 32 random bytes, base64-encoded
    pub fn generate_refresh_token(&self) -> String {
        let mut rng = rand::rng();
        let random_bytes: [u8; 32] = rng.random();
        general_purpose::STANDARD.encode(random_bytes)
    }

    /// HMAC-SHA256 hash of a refresh token; only the hash is stored
    pub fn hash_refresh_token(&self, token: &str) -> String {
        crypto::hmac_sha256_token(&self.refresh_token_secret, token)
    }

    /// Expiry timestamp for a refresh token issued now
    pub fn refresh_expiration(&self) -> i64 {
        Utc::now().timestamp() + self.refresh_ttl_days * 24 * 60 * 60
    }

    /// Seconds until a freshly issued access token expires
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_minutes * 60
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("jwt_secret", &"<redacted>")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("refresh_token_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            "test-secret-key-minimum-32-characters-long".to_string(),
            "test-refresh-secret-minimum-32-chars".to_string(),
            60,
            7,
        )
    }

    #[test]
    fn test_issue_and_validate_round_trip() {
        let svc = service();
        let token = svc.issue_access_token("user-123").unwrap();
        let claims = svc.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_access_ttl_is_capped_at_one_hour() {
        let svc = TokenService::new("s", "r", 240, 7);
        assert_eq!(svc.access_ttl_seconds(), 3600);
    }

    #[test]
    fn test_validation_fails_with_wrong_secret() {
        let svc = service();
        let other = TokenService::new(
            "another-secret-key-minimum-32-chars!".to_string(),
            "test-refresh-secret-minimum-32-chars".to_string(),
            60,
            7,
        );

        let token = svc.issue_access_token("user-123").unwrap();
        match other.validate_access_token(&token) {
            Err(InternalError::Authentication(AuthFailure::InvalidToken)) => {}
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_fails_with_expired_token() {
        let svc = service();
        let now = Utc::now().timestamp();
        let expired = Claims {
            sub: "user-123".to_string(),
            exp: now - 3600,
            iat: now - 7200,
            token_type: "access".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &expired,
            &EncodingKey::from_secret("test-secret-key-minimum-32-characters-long".as_bytes()),
        )
        .unwrap();

        match svc.validate_access_token(&token) {
            Err(InternalError::Authentication(AuthFailure::ExpiredToken)) => {}
            other => panic!("expected ExpiredToken, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_shaped_token_is_rejected() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-123".to_string(),
            exp: now + 3600,
            iat: now,
            token_type: "refresh".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-minimum-32-characters-long".as_bytes()),
        )
        .unwrap();

        match svc.validate_access_token(&token) {
            Err(InternalError::Authentication(AuthFailure::InvalidToken)) => {}
            other => panic!("expected InvalidToken, got {:?}", other),
        }
    }

    #[test]
    fn test_refresh_tokens_are_unique_and_opaque() {
        let svc = service();
        let t1 = svc.generate_refresh_token();
        let t2 = svc.generate_refresh_token();
        assert_ne!(t1, t2);
        assert_eq!(t1.len(), 44);
    }

    #[test]
    fn test_refresh_hash_is_stable() {
        let svc = service();
        let token = svc.generate_refresh_token();
        assert_eq!(svc.hash_refresh_token(&token), svc.hash_refresh_token(&token));
        assert_eq!(svc.hash_refresh_token(&token).len(), 64);
    }
}
