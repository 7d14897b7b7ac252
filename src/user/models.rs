use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored user record for the `users` table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub uid: String,      // UUID v4, stable for the record's lifetime
    pub username: String, // Not unique
    pub password: String, // bcrypt hash, never plaintext
}

impl UserModel {
    /// Creates a user record with a freshly generated uid
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            uid: Uuid::new_v4().to_string(),
            username,
            password: password_hash,
        }
    }
}
