//! Authorization capability and admin token issuing.
//!
//! Handlers never look at token contents themselves; they ask an
//! [`AdminAuthorizer`] whether the presented credential belongs to an admin.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access token lifetime in minutes.
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 60;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[async_trait]
pub trait AdminAuthorizer: Send + Sync {
    /// `credential` is the raw bearer token, if the caller presented one.
    async fn caller_is_admin(&self, credential: Option<&str>) -> bool;
}

/// HS256 tokens signed with the configured secret.
#[derive(Clone)]
pub struct JwtAuthorizer {
    secret: String,
}

impl JwtAuthorizer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn issue_token(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

        let claims = Claims {
            sub: subject.to_string(),
            role: ADMIN_ROLE.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

#[async_trait]
impl AdminAuthorizer for JwtAuthorizer {
    async fn caller_is_admin(&self, credential: Option<&str>) -> bool {
        let Some(token) = credential else {
            return false;
        };
        match self.verify(token) {
            Ok(claims) => claims.role == ADMIN_ROLE,
            Err(e) => {
                tracing::debug!(error = %e, "rejected admin token");
                false
            }
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Checks `password` against a bcrypt hash off the async executor.
pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_issue_and_verify_token() {
        let auth = JwtAuthorizer::new("test-secret");
        let token = auth.issue_token("admin@example.com").unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert_eq!(claims.role, ADMIN_ROLE);
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_EXPIRY_MINUTES * 60);
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = JwtAuthorizer::new("one").issue_token("a").unwrap();
        assert!(JwtAuthorizer::new("two").verify(&token).is_err());
    }

    #[tokio::test]
    async fn test_caller_is_admin() {
        let auth = JwtAuthorizer::new("test-secret");
        let token = auth.issue_token("admin").unwrap();

        assert!(auth.caller_is_admin(Some(&token)).await);
        assert!(!auth.caller_is_admin(None).await);
        assert!(!auth.caller_is_admin(Some("invalid.jwt.token")).await);
    }

    #[tokio::test]
    async fn test_non_admin_role_is_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: "reader".into(),
            role: "viewer".into(),
            exp: (now + Duration::minutes(5)).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let auth = JwtAuthorizer::new("test-secret");
        assert!(!auth.caller_is_admin(Some(&token)).await);
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_verify_password() {
        let hash = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify_password("s3cret".into(), hash.clone()).await);
        assert!(!verify_password("wrong".into(), hash).await);
        assert!(!verify_password("s3cret".into(), "not-a-hash".into()).await);
    }
}
