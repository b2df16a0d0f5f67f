//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TAVOLA_API_BASE_URL` - Base URL of the REST backend (e.g., <https://api.tavola.example>)
//! - `TAVOLA_ORIGIN` - Public origin of the storefront, used to derive the
//!   payment success/cancel callback URLs
//!
//! ## Optional
//! - `TAVOLA_DATA_DIR` - Directory for the persistent key-value store
//!   (default: `.tavola`)
//! - `GOOGLE_CLIENT_ID` - Google Sign-In OAuth client ID (federated login is
//!   disabled when unset)
//! - `TAVOLA_GOOGLE_READY_TIMEOUT_SECS` - Bounded wait for the identity
//!   provider to produce an ID token (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the REST backend.
    pub api_base_url: Url,
    /// Public origin of the storefront (scheme + host), for payment callbacks.
    pub origin: Url,
    /// Directory backing the persistent key-value store.
    pub data_dir: PathBuf,
    /// Google Sign-In client ID; federated login is unavailable when `None`.
    pub google_client_id: Option<String>,
    /// Bounded wait for the identity provider during federated login.
    pub google_ready_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_url(
            &get_required_env("TAVOLA_API_BASE_URL")?,
            "TAVOLA_API_BASE_URL",
        )?;
        let origin = parse_url(&get_required_env("TAVOLA_ORIGIN")?, "TAVOLA_ORIGIN")?;

        let data_dir = PathBuf::from(get_env_or_default("TAVOLA_DATA_DIR", ".tavola"));
        let google_client_id = get_optional_env("GOOGLE_CLIENT_ID");
        let google_ready_timeout = Duration::from_secs(
            get_env_or_default("TAVOLA_GOOGLE_READY_TIMEOUT_SECS", "10")
                .parse::<u64>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar(
                        "TAVOLA_GOOGLE_READY_TIMEOUT_SECS".to_string(),
                        e.to_string(),
                    )
                })?,
        );

        Ok(Self {
            api_base_url,
            origin,
            data_dir,
            google_client_id,
            google_ready_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a URL-valued variable, requiring an http(s) scheme and a host.
fn parse_url(value: &str, var_name: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_accepts_https() {
        let url = parse_url("https://api.tavola.example", "TEST_VAR").unwrap();
        assert_eq!(url.host_str(), Some("api.tavola.example"));
    }

    #[test]
    fn parse_url_rejects_other_schemes() {
        let result = parse_url("ftp://api.tavola.example", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn parse_url_rejects_garbage() {
        let result = parse_url("not a url", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn env_default_fallback() {
        assert_eq!(
            get_env_or_default("TAVOLA_TEST_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
