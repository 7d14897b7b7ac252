use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::auth::AuthService;
use crate::config::AuthConfig;
use crate::user::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub config: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(user_repository: Arc<dyn UserRepository + Send + Sync>, config: AuthConfig) -> Self {
        let auth_service = Arc::new(AuthService::new(user_repository, &config));

        Self {
            auth_service,
            config: Arc::new(config),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Password hash error: {0}")]
    PasswordHash(String),

    #[error("Error Logging In.")]
    LoginFailed,

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::LoginFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                AppError::LoginFailed.to_string(),
            ),
            // Internal details stay in the logs
            AppError::JwtError(_)
            | AppError::DatabaseError(_)
            | AppError::PasswordHash(_)
            | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "message": message,
            "success": false
        }));

        (status, body).into_response()
    }
}
