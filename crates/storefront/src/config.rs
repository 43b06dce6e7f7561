//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `BOOK_KART_API_URL` - API base URL (default: `http://localhost:8000/api`)
//! - `BOOK_KART_CACHE_TTL_SECS` - Lifetime of cached query results (default: 60)
//! - `BOOK_KART_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `BOOK_KART_STATE_PATH` - Persisted state file (default: `.book-kart/state.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default API base URL, a locally running backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

const DEFAULT_CACHE_TTL_SECS: &str = "60";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "30";
const DEFAULT_STATE_PATH: &str = ".book-kart/state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to
    pub api_url: Url,
    /// How long a cached query result stays valid
    pub cache_ttl: Duration,
    /// Timeout for a single request
    pub request_timeout: Duration,
    /// Where the persisted auth state lives
    pub state_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None).unwrap_or_else(|_| unreachable!("defaults are valid"))
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = parse_api_url(
            "BOOK_KART_API_URL",
            &get_or_default(&lookup, "BOOK_KART_API_URL", DEFAULT_API_URL),
        )?;
        let cache_ttl = parse_secs(
            "BOOK_KART_CACHE_TTL_SECS",
            &get_or_default(&lookup, "BOOK_KART_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
        )?;
        let request_timeout = parse_secs(
            "BOOK_KART_REQUEST_TIMEOUT_SECS",
            &get_or_default(
                &lookup,
                "BOOK_KART_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
        )?;
        let state_path = PathBuf::from(get_or_default(
            &lookup,
            "BOOK_KART_STATE_PATH",
            DEFAULT_STATE_PATH,
        ));
        let sentry_dsn = lookup("SENTRY_DSN").filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_url,
            cache_ttl,
            request_timeout,
            state_path,
            sentry_dsn,
        })
    }

    /// Configuration pointing at a specific API, other values defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url("api_url", api_url)?,
            ..Self::default()
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a variable, falling back to a default when unset or blank.
fn get_or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse the API base URL; only http and https are accepted.
fn parse_api_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme {}", url.scheme()),
        ));
    }

    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
