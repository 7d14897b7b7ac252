// Public API - what other modules can use
pub use models::UserModel;
pub use password::PasswordHasher;
pub use repository::{InMemoryUserRepository, PostgresUserRepository, UserLookup, UserRepository};

pub mod models;
pub mod password;
pub mod repository;
