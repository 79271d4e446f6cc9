use serde::{Deserialize, Serialize};

use crate::config::Environment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Where and how verbosely to log.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub environment: Environment,
    pub level: LogLevel,
    pub directory: String,
}

impl LogConfig {
    /// Reads `LOG_LEVEL` and `LOG_DIR`. Unknown levels fall back to the
    /// environment default: `info` in production, `debug` otherwise.
    pub fn from_env(environment: Environment) -> Self {
        let default_level = if environment.is_production() {
            LogLevel::Info
        } else {
            LogLevel::Debug
        };

        Self {
            environment,
            level: std::env::var("LOG_LEVEL")
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(default_level),
            directory: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        }
    }

    /// Default directive when `RUST_LOG` is not set.
    pub fn default_directive(&self) -> String {
        format!(
            "portfolio_blog={},tower_http=debug,axum=debug",
            self.level
        )
    }
}
