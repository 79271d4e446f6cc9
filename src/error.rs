//! Error kinds surfaced by the blog core and their HTTP mapping.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::AppState;

#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Authorization required")]
    Unauthorized,

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("render failure: {0}")]
    Render(String),
}

impl BlogError {
    pub fn validation(message: impl Into<String>) -> Self {
        BlogError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BlogError::Validation(_) => StatusCode::BAD_REQUEST,
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::Unauthorized => StatusCode::UNAUTHORIZED,
            BlogError::Storage(_) | BlogError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body shared by every handler.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

const INTERNAL_ERROR: &str = "Internal server error";

/// Failure detail carried on a 500 response as an extension, never in the body.
///
/// [`expose_error_detail`] copies it into the body outside production.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            BlogError::Storage(e) => {
                tracing::error!(error = %e, "content store failure");
                Some(e.to_string())
            }
            BlogError::Render(detail) => {
                tracing::error!(error = %detail, "markdown render failure");
                Some(detail.clone())
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: if detail.is_some() {
                INTERNAL_ERROR.to_string()
            } else {
                self.to_string()
            },
            message: None,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(detail) = detail {
            response.extensions_mut().insert(ErrorDetail(detail));
        }
        response
    }
}

/// Middleware that puts [`ErrorDetail`] into the error body unless the
/// configured environment is production.
pub async fn expose_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if state.config.environment.is_production() {
        return response;
    }

    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    let body = Json(ErrorResponse {
        error: INTERNAL_ERROR.to_string(),
        message: Some(detail),
    })
    .into_response()
    .into_body();
    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment};
    use crate::store::MemoryContentStore;
    use crate::test_support::send;
    use axum::body::Body;
    use axum::{middleware, routing::get};
    use std::sync::Arc;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BlogError::validation("Title and content are required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(BlogError::NotFound("Post").status(), StatusCode::NOT_FOUND);
        assert_eq!(BlogError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            BlogError::Render("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message_names_the_entity() {
        assert_eq!(BlogError::NotFound("Post").to_string(), "Post not found");
    }

    #[tokio::test]
    async fn test_storage_error_body_hides_kind_behind_generic_message() {
        let err = BlogError::Storage(StoreError::Unavailable("pool closed".into()));
        let res = err.into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Internal server error");
        assert!(body.message.is_none());
    }

    fn failing_app(environment: Environment) -> axum::Router {
        let config = AppConfig {
            environment,
            ..AppConfig::default()
        };
        let state = AppState::new(config, Arc::new(MemoryContentStore::new()));
        axum::Router::new()
            .route(
                "/fail",
                get(|| async {
                    Err::<(), _>(BlogError::Storage(StoreError::Unavailable(
                        "pool closed".into(),
                    )))
                }),
            )
            .layer(middleware::from_fn_with_state(
                state.clone(),
                expose_error_detail,
            ))
            .with_state(state)
    }

    async fn fail_body(environment: Environment) -> (StatusCode, ErrorResponse) {
        let (status, bytes) = send(
            failing_app(environment),
            axum::http::Request::get("/fail").body(Body::empty()).unwrap(),
        )
        .await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_detail_shown_in_development() {
        let (status, body) = fail_body(Environment::Development).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
        assert!(body.message.unwrap().contains("pool closed"));
    }

    #[tokio::test]
    async fn test_error_detail_hidden_for_production_config() {
        let (status, body) = fail_body(Environment::Production).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Internal server error");
        assert!(body.message.is_none());
    }
}
