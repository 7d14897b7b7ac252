use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Result of looking a user up by username
#[derive(Debug, Clone, PartialEq)]
pub enum UserLookup {
    /// A record with this exact username exists
    Found(UserModel),
    /// No record has this username
    NotFound,
}

/// Trait for credential store operations
#[async_trait]
pub trait UserRepository {
    /// Returns the first record whose username matches exactly
    async fn find_by_username(&self, username: &str) -> Result<UserLookup, AppError>;

    /// Persists a new record. Usernames are not checked for uniqueness.
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Records are kept in insertion order so lookups return the oldest match,
/// and are lost when the application restarts.
pub struct InMemoryUserRepository {
    users: Mutex<Vec<UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated users
    pub fn with_users(users: Vec<UserModel>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    /// Returns the current number of stored users
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns every record with the given username
    pub fn users_named(&self, username: &str) -> Vec<UserModel> {
        self.users
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|u| u.username == username)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<UserLookup, AppError> {
        debug!(username = %username, "Fetching user from memory");

        let users = self
            .users
            .lock()
            .map_err(|_| AppError::DatabaseError("user store lock poisoned".to_string()))?;

        match users.iter().find(|u| u.username == username) {
            Some(user) => {
                debug!(username = %username, uid = %user.uid, "User found in memory");
                Ok(UserLookup::Found(user.clone()))
            }
            None => {
                debug!(username = %username, "User not found in memory");
                Ok(UserLookup::NotFound)
            }
        }
    }

    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(uid = %user.uid, username = %user.username, "Inserting user in memory");

        let mut users = self
            .users
            .lock()
            .map_err(|_| AppError::DatabaseError("user store lock poisoned".to_string()))?;

        if users.iter().any(|u| u.uid == user.uid) {
            warn!(uid = %user.uid, "User uid already exists in memory");
            return Err(AppError::DatabaseError("User uid already exists".to_string()));
        }
        users.push(user.clone());

        debug!(uid = %user.uid, "User inserted successfully in memory");
        Ok(())
    }
}

/// Oldest record first, matching the in-memory store
const FIND_BY_USERNAME_SQL: &str =
    "SELECT uid, username, password FROM users WHERE username = $1 ORDER BY seq ASC LIMIT 1";

/// PostgreSQL implementation of the credential store
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `users` table if it does not exist yet
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (seq BIGSERIAL, uid TEXT PRIMARY KEY, username TEXT NOT NULL, password TEXT NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create users table");
            AppError::DatabaseError(e.to_string())
        })?;

        // tables created before the insertion-order column existed
        sqlx::query("ALTER TABLE users ADD COLUMN IF NOT EXISTS seq BIGSERIAL")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to add users seq column");
                AppError::DatabaseError(e.to_string())
            })?;

        // plain index, usernames may repeat
        sqlx::query("CREATE INDEX IF NOT EXISTS users_username_seq_idx ON users (username, seq)")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create users username index");
                AppError::DatabaseError(e.to_string())
            })?;

        info!("Users table ready");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<UserLookup, AppError> {
        debug!(username = %username, "Fetching user from database");

        let user = sqlx::query_as::<_, UserModel>(FIND_BY_USERNAME_SQL)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, username = %username, "Failed to fetch user from database");
                AppError::DatabaseError(e.to_string())
            })?;

        match user {
            Some(user) => {
                debug!(username = %username, uid = %user.uid, "User found in database");
                Ok(UserLookup::Found(user))
            }
            None => {
                debug!(username = %username, "User not found in database");
                Ok(UserLookup::NotFound)
            }
        }
    }

    #[instrument(skip(self, user))]
    async fn insert_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!(uid = %user.uid, username = %user.username, "Inserting user in database");

        sqlx::query("INSERT INTO users (uid, username, password) VALUES ($1, $2, $3)")
            .bind(&user.uid)
            .bind(&user.username)
            .bind(&user.password)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, uid = %user.uid, "Failed to insert user in database");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(uid = %user.uid, "User inserted successfully in database");
        Ok(())
    }
}
