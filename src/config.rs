//! Application configuration loaded from environment variables.
//!
//! Secrets are injected as environment variables by Cloud Run secret
//! bindings, so everything is read once at startup and cached in memory.

use std::env;

/// Cloud Tasks queue used for status-change notification fan-out.
pub const NOTIFY_QUEUE_NAME: &str = "status-notifications";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Base URL of the push-delivery service that consumes queued
    /// status-change tasks
    pub notify_service_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// GCP region (Cloud Tasks queue location)
    pub gcp_region: String,
    /// Server port
    pub port: u16,
    /// JWT verification key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// For local development, secrets can be set via a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            notify_service_url: env::var("NOTIFY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            gcp_region: env::var("GCP_REGION").unwrap_or_else(|_| "us-west1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            notify_service_url: "http://localhost:8081".to_string(),
            gcp_project_id: "test-project".to_string(),
            gcp_region: "us-west1".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert!(!config.jwt_signing_key.is_empty());
        // Queued tasks must target the delivery service, not this API.
        assert!(!config.notify_service_url.is_empty());
    }

    #[test]
    fn test_notify_service_url_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("NOTIFY_SERVICE_URL", "https://notify.example.com");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.notify_service_url, "https://notify.example.com");

        env::remove_var("NOTIFY_SERVICE_URL");
    }
}
