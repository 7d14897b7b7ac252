// Library crate for the blog authentication service
// This file exposes the public API for integration tests

pub mod auth;
pub mod config;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use auth::{AuthService, TokenConfig, TokenValidation};
pub use config::AuthConfig;
pub use shared::{AppError, AppState};
pub use user::{InMemoryUserRepository, PostgresUserRepository, UserModel, UserRepository};
