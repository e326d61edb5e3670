//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `COFFEE_STORE_URL` - Base URL of the hosted store (falls back to `SUPABASE_URL`).
//!   Without it the app has no remote store configured.
//! - `COFFEE_STORE_ANON_KEY` - Anonymous API key (falls back to `SUPABASE_ANON_KEY`).
//!   Required once a store URL is set.
//! - `COFFEE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `COFFEE_PREFERENCES_PATH` - UI preference file (default: .coffee-compass/preferences.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_PREFERENCES_PATH: &str = ".coffee-compass/preferences.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Remote store connection, `None` when no store URL is configured
    pub store: Option<StoreConfig>,
    /// Where the active-tab preference is persisted
    pub preferences_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Remote store connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct StoreConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Anonymous API key
    pub anon_key: SecretString,
    /// Timeout applied to every request
    pub request_timeout: Duration,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a store URL is set without a key, or if any
    /// value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = StoreConfig::from_source(env)?;
        let preferences_path = PathBuf::from(get_env_or_default(
            env,
            "COFFEE_PREFERENCES_PATH",
            DEFAULT_PREFERENCES_PATH,
        ));

        Ok(Self {
            store,
            preferences_path,
            sentry_dsn: get_optional_env(env, "SENTRY_DSN"),
            sentry_environment: get_optional_env(env, "SENTRY_ENVIRONMENT"),
        })
    }
}

impl StoreConfig {
    fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = get_with_fallback(env, "COFFEE_STORE_URL", "SUPABASE_URL") else {
            return Ok(None);
        };
        let base_url = parse_base_url(&raw_url)?;

        let anon_key = get_with_fallback(env, "COFFEE_STORE_ANON_KEY", "SUPABASE_ANON_KEY")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("COFFEE_STORE_ANON_KEY".to_string()))?;

        let timeout_secs = get_env_or_default(
            env,
            "COFFEE_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("COFFEE_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Some(Self {
            base_url,
            anon_key,
            request_timeout: Duration::from_secs(timeout_secs),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the store URL and make sure relative joins land under it.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar("COFFEE_STORE_URL".to_string(), e.to_string()))?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "COFFEE_STORE_URL".to_string(),
            "must be an http(s) URL".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|v| !v.trim().is_empty())
}

/// Get a variable, falling back to a second name (used by hosted project env files).
fn get_with_fallback(
    env: &dyn Fn(&str) -> Option<String>,
    primary_key: &str,
    fallback_key: &str,
) -> Option<String> {
    get_optional_env(env, primary_key).or_else(|| get_optional_env(env, fallback_key))
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(env, key).unwrap_or_else(|| default.to_string())
}
