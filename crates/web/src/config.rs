//! Web client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STORE_RATING_HOST` - Bind address (default: 127.0.0.1)
//! - `STORE_RATING_PORT` - Listen port (default: 3000)
//! - `STORE_RATING_BASE_URL` - Public URL of this client (default: `http://{host}:{port}`)
//! - `STORE_RATING_API_URL` - Base URL of the rating API (default: `http://localhost:5001/api`)
//! - `STORE_RATING_LOG_JSON` - Emit JSON logs when set (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

/// Default rating API location.
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Rating API connection settings.
///
/// No request timeout is configured here; the API side owns timeouts.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: Url,
}

impl ApiConfig {
    /// Build from a URL string.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(raw).map_err(|e| {
            ConfigError::InvalidEnvVar("STORE_RATING_API_URL".to_string(), e.to_string())
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "STORE_RATING_API_URL".to_string(),
                format!("unsupported scheme: {}", base_url.scheme()),
            ));
        }
        Ok(Self { base_url })
    }

    /// Load from `STORE_RATING_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable holds an invalid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(&get_env_or_default("STORE_RATING_API_URL", DEFAULT_API_URL))
    }

    /// Base URL without a trailing slash, ready for `{base}{path}` joins.
    #[must_use]
    pub fn base(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }
}

/// Web client configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of this client
    pub base_url: String,
    /// Rating API settings
    pub api: ApiConfig,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl WebConfig {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STORE_RATING_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_RATING_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STORE_RATING_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_RATING_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_optional_env("STORE_RATING_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        let api = ApiConfig::from_env()?;
        let log_json = get_optional_env("STORE_RATING_LOG_JSON").is_some_and(|v| is_truthy(&v));

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        Ok(Self {
            host,
            port,
            base_url,
            api,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the client is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
