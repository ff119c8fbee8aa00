use crate::types::dto::user::UserSummary;
use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::{Deserialize, Serialize};

/// Request model for mobile self-registration
#[derive(Object, Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    /// E.164, optionally without the leading +
    pub phone: String,

    /// "tenant" or "owner"
    pub role_hint: String,
}

/// Request model for login. Exactly one of `email`, `phone`, or the
/// legacy `identifier` carries the account lookup key.
#[derive(Object, Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: Option<String>,

    /// Phone number, with or without the leading +
    pub phone: Option<String>,

    /// Email or phone in one field, for clients predating the split
    pub identifier: Option<String>,

    pub password: String,
}

impl LoginRequest {
    /// The account lookup key, preferring the explicit fields
    pub fn lookup_key(&self) -> Option<&str> {
        [&self.email, &self.phone, &self.identifier]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// The token pair nested inside authentication responses
#[derive(Object, Debug, Serialize)]
pub struct TokenPairBody {
    /// JWT access token for API authentication
    pub access: String,

    /// Opaque refresh token; single-use, replaced on every refresh
    pub refresh: String,
}

/// Response model containing authentication tokens
#[derive(Object, Debug, Serialize)]
pub struct TokenResponse {
    pub success: bool,
    pub message: String,

    /// Approval state of the account ("approved" or "pending")
    pub status: String,

    pub tokens: TokenPairBody,

    /// JWT access token, duplicated flat for older clients
    pub access_token: String,

    /// Opaque refresh token, duplicated flat for older clients
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,

    pub user: UserSummary,
}

/// Success response for signup; a fresh account is a 201
#[derive(ApiResponse)]
pub enum SignupResponse {
    #[oai(status = 201)]
    Created(Json<TokenResponse>),
}

/// Request model for token refresh
#[derive(Object, Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response model for token refresh; both tokens must be replaced
#[derive(Object, Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Request model for logout
#[derive(Object, Debug, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to revoke
    pub refresh_token: String,
}

/// Response model for the verify endpoint
#[derive(Object, Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
    pub username: String,
}

/// Request model for the reset queue
#[derive(Object, Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Request model for a self-service password change
#[derive(Object, Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Response model for the profile endpoint
#[derive(Object, Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: UserSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: Option<&str>, phone: Option<&str>, identifier: Option<&str>) -> LoginRequest {
        LoginRequest {
            email: email.map(str::to_string),
            phone: phone.map(str::to_string),
            identifier: identifier.map(str::to_string),
            password: "Passw0rd".to_string(),
        }
    }

    #[test]
    fn test_lookup_key_accepts_each_field() {
        assert_eq!(request(Some("a@x.io"), None, None).lookup_key(), Some("a@x.io"));
        assert_eq!(request(None, Some("255712345678"), None).lookup_key(), Some("255712345678"));
        assert_eq!(request(None, None, Some("a@x.io")).lookup_key(), Some("a@x.io"));
    }

    #[test]
    fn test_lookup_key_prefers_explicit_fields() {
        let req = request(Some("a@x.io"), Some("255712345678"), Some("other"));
        assert_eq!(req.lookup_key(), Some("a@x.io"));
    }

    #[test]
    fn test_lookup_key_skips_blank_fields() {
        assert_eq!(request(Some("  "), Some("255712345678"), None).lookup_key(), Some("255712345678"));
        assert_eq!(request(None, None, None).lookup_key(), None);
        assert_eq!(request(Some(""), None, Some("")).lookup_key(), None);
    }
}
