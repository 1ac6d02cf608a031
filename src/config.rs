//! Runtime configuration, sourced from environment variables.
//!
//! Mirrors the defaults a deployed gateway ships with out of the box —
//! everything works against a local Redis with no configuration at all,
//! and each setting can be overridden independently.

use crate::error::{ConfigError, Result};
use crate::rule::AlgorithmKind;

/// Rate limiter service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Redis host.
    pub redis_host: String,
    /// Redis port.
    pub redis_port: u16,
    /// Redis logical database index.
    pub redis_db: u8,
    /// Redis password, empty if unauthenticated.
    pub redis_password: String,
    /// Bind host for the HTTP API.
    pub api_host: String,
    /// Bind port for the HTTP API.
    pub api_port: u16,
    /// Algorithm used when a rule doesn't specify one explicitly.
    pub default_algorithm: String,
    /// Log level passed through to the tracing subscriber the embedding
    /// application installs.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            redis_host: "localhost".into(),
            redis_port: 6379,
            redis_db: 0,
            redis_password: String::new(),
            api_host: "0.0.0.0".into(),
            api_port: 8000,
            default_algorithm: "token_bucket".into(),
            log_level: "info".into(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables, falling back to defaults
    /// for anything unset. Returns an error if a set variable can't be
    /// parsed, or names an unknown algorithm.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();

        if let Ok(v) = std::env::var("REDIS_HOST") {
            settings.redis_host = v;
        }
        if let Ok(v) = std::env::var("REDIS_PORT") {
            settings.redis_port = v
                .parse()
                .map_err(|_| ConfigError::InvalidStorage(format!("REDIS_PORT must be a port number, got {v:?}")))?;
        }
        if let Ok(v) = std::env::var("REDIS_DB") {
            settings.redis_db = v
                .parse()
                .map_err(|_| ConfigError::InvalidStorage(format!("REDIS_DB must be a small integer, got {v:?}")))?;
        }
        if let Ok(v) = std::env::var("REDIS_PASSWORD") {
            settings.redis_password = v;
        }
        if let Ok(v) = std::env::var("API_HOST") {
            settings.api_host = v;
        }
        if let Ok(v) = std::env::var("API_PORT") {
            settings.api_port = v
                .parse()
                .map_err(|_| ConfigError::InvalidStorage(format!("API_PORT must be a port number, got {v:?}")))?;
        }
        if let Ok(v) = std::env::var("DEFAULT_ALGORITHM") {
            AlgorithmKind::parse(&v)?;
            settings.default_algorithm = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            settings.log_level = v;
        }

        Ok(settings)
    }

    /// Build the Redis connection URL these settings describe.
    pub fn redis_url(&self) -> String {
        if self.redis_password.is_empty() {
            format!("redis://{}:{}/{}", self.redis_host, self.redis_port, self.redis_db)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                self.redis_password, self.redis_host, self.redis_port, self.redis_db
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_local_redis() {
        let settings = Settings::default();
        assert_eq!(settings.redis_url(), "redis://localhost:6379/0");
        assert_eq!(settings.default_algorithm, "token_bucket");
        assert_eq!(settings.api_port, 8000);
    }

    #[test]
    fn test_redis_url_with_password() {
        let mut settings = Settings::default();
        settings.redis_password = "hunter2".into();
        assert_eq!(settings.redis_url(), "redis://:hunter2@localhost:6379/0");
    }
}
