/**
 * Authentication Routes
 * Admin login, capability check and the neutral password-reset acknowledgement
 */
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{verify_password, ACCESS_TOKEN_EXPIRY_MINUTES};
use crate::error::BlogError;
use crate::routes::caller_is_admin;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            access_token: None,
            expires_in: None,
            error: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatusResponse {
    pub is_admin: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ResetPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetPasswordResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Checks the configured admin credentials and issues an access token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> (StatusCode, Json<LoginResponse>) {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Email and password are required")),
        );
    }

    if !payload.email.contains('@') {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Invalid email format")),
        );
    }

    let email_matches = payload.email.trim().eq_ignore_ascii_case(&state.config.admin_email);
    let password_matches = match &state.config.admin_password_hash {
        Some(hash) => verify_password(payload.password, hash.clone()).await,
        None => {
            tracing::warn!("login attempted but no admin password is configured");
            false
        }
    };

    if !email_matches || !password_matches {
        tracing::warn!(email = %payload.email, "failed admin login");
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failure("Invalid credentials")),
        );
    }

    match state.tokens.issue_token(&state.config.admin_email) {
        Ok(token) => {
            tracing::info!(email = %state.config.admin_email, "admin logged in");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    success: true,
                    access_token: Some(token),
                    expires_in: Some(ACCESS_TOKEN_EXPIRY_MINUTES * 60),
                    error: None,
                }),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to create access token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::failure("Failed to create token")),
            )
        }
    }
}

/// GET /api/auth/admin
/// Reports whether the presented bearer token carries admin rights
pub async fn admin_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<AdminStatusResponse> {
    Json(AdminStatusResponse {
        is_admin: caller_is_admin(&state, &headers).await,
    })
}

/// POST /api/auth/reset-password
///
/// Answers the same way whether or not the address belongs to an account.
pub async fn reset_password(
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, BlogError> {
    let email = payload
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| BlogError::validation("Email is required"))?;

    tracing::info!(email = %email, "password reset requested");

    Ok(Json(ResetPasswordResponse {
        success: true,
        message: "If an account exists for that address, a reset link has been sent.".to_string(),
    }))
}
