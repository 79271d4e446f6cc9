//! Application configuration, read once from the environment at startup.

use axum::http::HeaderValue;

/// Secret used when `JWT_SECRET` is unset. Rejected in production.
pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

/// Admin address used when `ADMIN_EMAIL` is unset.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match std::env::var("ENVIRONMENT").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub admin_email: String,
    /// bcrypt hash of the admin password, if one was configured.
    pub admin_password_hash: Option<String>,
    pub upload_dir: String,
    pub public_upload_base: String,
    pub site_url: String,
    pub site_title: String,
    pub site_description: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: 3001,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password_hash: None,
            upload_dir: "uploads".to_string(),
            public_upload_base: "/uploads".to_string(),
            site_url: "http://localhost:3000".to_string(),
            site_title: "Portfolio Blog".to_string(),
            site_description: "Latest articles and insights".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .or_else(|| std::env::var("FRONTEND_ORIGIN").ok().map(|origin| vec![origin]))
            .unwrap_or(defaults.allowed_origins);

        let admin_password_hash = match std::env::var("ADMIN_HASH_PASSWORD") {
            Ok(hash) if !hash.is_empty() => Some(hash),
            _ => std::env::var("ADMIN_PASSWORD")
                .ok()
                .filter(|plain| !plain.is_empty())
                .and_then(|plain| bcrypt::hash(plain, bcrypt::DEFAULT_COST).ok()),
        };

        Self {
            environment: Environment::from_env(),
            host: env_or("HOST", defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            allowed_origins,
            jwt_secret: env_or("JWT_SECRET", defaults.jwt_secret),
            admin_email: env_or("ADMIN_EMAIL", defaults.admin_email),
            admin_password_hash,
            upload_dir: env_or("UPLOAD_DIR", defaults.upload_dir),
            public_upload_base: env_or("PUBLIC_UPLOAD_BASE", defaults.public_upload_base)
                .trim_end_matches('/')
                .to_string(),
            site_url: env_or("SITE_URL", defaults.site_url)
                .trim_end_matches('/')
                .to_string(),
            site_title: env_or("SITE_TITLE", defaults.site_title),
            site_description: env_or("SITE_DESCRIPTION", defaults.site_description),
        }
    }

    /// Origins that parse as header values; malformed entries are skipped.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect()
    }

    /// Startup checks. Returns an error message for conditions that must stop the server.
    pub fn validate(&self) -> Result<(), String> {
        if !self.environment.is_production() {
            return Ok(());
        }

        if self.jwt_secret.is_empty() || self.jwt_secret == DEFAULT_JWT_SECRET {
            return Err("JWT_SECRET must be set to a secure, unique value in production. \
                 Refusing to start with the default secret."
                .to_string());
        }

        if self.admin_email.is_empty() || self.admin_email == DEFAULT_ADMIN_EMAIL {
            tracing::warn!(
                "SECURITY: ADMIN_EMAIL is using an insecure default. \
                 Set ADMIN_EMAIL env var to a real address."
            );
        }
        if self.admin_password_hash.is_none() {
            tracing::warn!(
                "SECURITY: Neither ADMIN_HASH_PASSWORD nor ADMIN_PASSWORD is set. \
                 Admin login is disabled until one is configured."
            );
        }

        Ok(())
    }
}

fn env_or(key: &str, fallback: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(fallback)
}
