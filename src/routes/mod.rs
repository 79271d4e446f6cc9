/**
 * Routes Module
 * API route handlers
 */

pub mod auth;
pub mod blog;
pub mod health;
pub mod rss;
pub mod upload;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::bearer_token;
use crate::error::BlogError;
use crate::AppState;

pub(crate) async fn caller_is_admin(state: &AppState, headers: &HeaderMap) -> bool {
    state.authorizer.caller_is_admin(bearer_token(headers)).await
}

/// Route layer guarding the admin endpoints.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BlogError> {
    if !caller_is_admin(&state, request.headers()).await {
        tracing::warn!(uri = %request.uri(), "admin route called without a valid token");
        return Err(BlogError::Unauthorized);
    }
    Ok(next.run(request).await)
}
