use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed token payload binding an issuance time to a user uid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub time: DateTime<Utc>,
    #[serde(rename = "userId")]
    pub user_id: String,
    // Only present when a token TTL is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// Body of `POST /register-user` and `POST /login-user`
#[derive(Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Response for registration and token validation
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response for login; `token` is only present on success
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl LoginResponse {
    pub fn authenticated(token: String) -> Self {
        Self {
            success: true,
            token: Some(token),
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            token: None,
        }
    }
}
