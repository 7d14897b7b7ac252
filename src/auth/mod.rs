use axum::{
    routing::{get, post},
    Router,
};

use crate::shared::AppState;

// Public API - what other modules can use
pub use handlers::{login_user, register_user, validate_token};
pub use service::{AuthService, LoginOutcome, RegisterOutcome};
pub use token::{TokenConfig, TokenValidation};
pub use types::{CredentialsRequest, LoginResponse, SuccessResponse, TokenClaims};

// Internal modules
mod handlers;
pub mod service;
pub mod token;
pub mod types;

/// Routes for the register / login / validate-token flow
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register-user", post(register_user))
        .route("/login-user", post(login_user))
        .route("/validate-token", get(validate_token))
}
