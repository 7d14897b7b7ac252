use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, instrument, warn};

use super::{
    service::{LoginOutcome, RegisterOutcome},
    token::TokenValidation,
    types::{CredentialsRequest, LoginResponse, SuccessResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a user
///
/// POST /register-user
/// 200 with success true/false depending on the insert, 500 if hashing failed
#[instrument(name = "register_user", skip(state, request), fields(username = %request.username))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> (StatusCode, Json<SuccessResponse>) {
    match state
        .auth_service
        .register(&request.username, &request.password)
        .await
    {
        Ok(RegisterOutcome::Created(user)) => {
            info!(uid = %user.uid, "User registration completed");
            (StatusCode::OK, Json(SuccessResponse { success: true }))
        }
        Ok(RegisterOutcome::NotStored) => {
            (StatusCode::OK, Json(SuccessResponse { success: false }))
        }
        Err(e) => {
            error!(error = %e, "User registration failed before insert");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SuccessResponse { success: false }),
            )
        }
    }
}

/// HTTP handler for logging in
///
/// POST /login-user
/// Returns a signed token on success; 204 for an unknown username
#[instrument(name = "login_user", skip(state, request), fields(username = %request.username))]
pub async fn login_user(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth_service
        .login(&request.username, &request.password)
        .await
        .map_err(|e| {
            error!(error = %e, "Login failed");
            AppError::LoginFailed
        })?;

    let response = match outcome {
        LoginOutcome::Authenticated { token } => {
            (StatusCode::OK, Json(LoginResponse::authenticated(token))).into_response()
        }
        LoginOutcome::UnknownUser => {
            (StatusCode::NO_CONTENT, Json(LoginResponse::rejected())).into_response()
        }
        LoginOutcome::WrongPassword => {
            (StatusCode::OK, Json(LoginResponse::rejected())).into_response()
        }
    };

    Ok(response)
}

/// HTTP handler for checking a token
///
/// GET /validate-token
/// Reads the token from the configured header, 401 unless it verifies
#[instrument(name = "validate_token", skip(state, headers))]
pub async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SuccessResponse>, AppError> {
    let header_key = &state.config.token_header_key;

    let raw = headers
        .get(header_key)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            warn!(header = %header_key, "Missing or unreadable token header");
            AppError::Unauthorized(format!("Missing {} header", header_key))
        })?;

    // Accept both a bare token and an Authorization-style "Bearer <token>"
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();

    match state.auth_service.validate_token(token) {
        TokenValidation::Valid(_) => Ok(Json(SuccessResponse { success: true })),
        TokenValidation::Invalid(reason) => Err(AppError::Unauthorized(reason)),
    }
}
