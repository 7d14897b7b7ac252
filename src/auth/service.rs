use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::token::{TokenConfig, TokenValidation};
use crate::config::AuthConfig;
use crate::shared::AppError;
use crate::user::{PasswordHasher, UserLookup, UserModel, UserRepository};

/// Result of a registration attempt that got as far as the store
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Created(UserModel),
    /// The store rejected the insert; the cause has been logged
    NotStored,
}

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated { token: String },
    UnknownUser,
    WrongPassword,
}

/// Sequences the credential store, password hasher and token signer
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    hasher: PasswordHasher,
    tokens: TokenConfig,
}

impl AuthService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>, config: &AuthConfig) -> Self {
        Self {
            repository,
            hasher: PasswordHasher::new(config.password_hash_cost),
            tokens: TokenConfig::from_config(config),
        }
    }

    /// Hashes the password and stores a new user record.
    ///
    /// Hashing failures are errors; a failed insert is reported as `NotStored`.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RegisterOutcome, AppError> {
        info!("Starting user registration");

        let password_hash = self.hasher.hash(password).await?;
        let user = UserModel::new(username.to_string(), password_hash);

        match self.repository.insert_user(&user).await {
            Ok(()) => {
                info!(uid = %user.uid, "User registered");
                Ok(RegisterOutcome::Created(user))
            }
            Err(e) => {
                warn!(error = %e, "Failed to store new user");
                Ok(RegisterOutcome::NotStored)
            }
        }
    }

    /// Checks credentials and issues a token on success
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AppError> {
        info!("Starting login");

        let user = match self.repository.find_by_username(username).await? {
            UserLookup::Found(user) => user,
            UserLookup::NotFound => {
                info!("Login for unknown username");
                return Ok(LoginOutcome::UnknownUser);
            }
        };

        if !self.hasher.verify(password, &user.password).await? {
            info!(uid = %user.uid, "Login rejected, password mismatch");
            return Ok(LoginOutcome::WrongPassword);
        }

        let token = self.tokens.create_token(&user.uid)?;
        info!(uid = %user.uid, "Login succeeded, token issued");

        Ok(LoginOutcome::Authenticated { token })
    }

    /// Verifies a presented token
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> TokenValidation {
        let validation = self.tokens.validate_token(token);

        match &validation {
            TokenValidation::Valid(claims) => {
                info!(user_id = %claims.user_id, "Token validated")
            }
            TokenValidation::Invalid(reason) => warn!(reason = %reason, "Token rejected"),
        }

        validation
    }
}
