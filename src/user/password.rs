use tracing::{debug, instrument, warn};

use crate::shared::AppError;

/// Salted bcrypt hashing at a fixed cost.
///
/// Both operations are CPU bound and run on the blocking pool.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes `plain` with a freshly generated salt
    #[instrument(skip(self, plain), fields(cost = self.cost))]
    pub async fn hash(&self, plain: &str) -> Result<String, AppError> {
        let plain = plain.to_owned();
        let cost = self.cost;

        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password hashing task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                warn!(error = %e, "Failed to hash password");
                AppError::PasswordHash(e.to_string())
            })?;

        debug!("Password hashed");
        Ok(hash)
    }

    /// Compares `plain` against a stored hash.
    ///
    /// A stored hash that cannot be parsed is an error, not a mismatch.
    #[instrument(skip(self, plain, hash))]
    pub async fn verify(&self, plain: &str, hash: &str) -> Result<bool, AppError> {
        let plain = plain.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash))
            .await
            .map_err(|e| {
                warn!(error = %e, "Password verification task failed");
                AppError::Internal
            })?
            .map_err(|e| {
                warn!(error = %e, "Failed to verify password against stored hash");
                AppError::PasswordHash(e.to_string())
            })
    }
}
