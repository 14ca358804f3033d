//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for the session
//!   store (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_BASE_URL` - REST backend address (default: <http://localhost:8080>)
//! - `BACKEND_TIMEOUT_SECS` - Per-request timeout for backend calls (default: 30)
//! - `DESIGNER_UNIT_PRICE` - Price of one custom t-shirt (default: 150.00)
//! - `DESIGNER_MAX_UPLOAD_BYTES` - Artwork size limit (default: 10 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use teeforge_core::Money;
use teeforge_core::design::MAX_UPLOAD_BYTES;
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
///
/// Implements `Debug` manually to redact the database URL.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` URL for the session store (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// REST backend connection settings
    pub backend: BackendConfig,
    /// Design editor settings
    pub designer: DesignerConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("database_url", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("backend", &self.backend)
            .field("designer", &self.designer)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .finish_non_exhaustive()
    }
}

/// Where the REST backend lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl BackendConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Load only the backend section. Used by the CLI, which has no need for
    /// the session database.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for a malformed URL or timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_source(&EnvSource)
    }

    fn from_source(env: &impl Source) -> Result<Self, ConfigError> {
        let raw = get_env_or_default(env, "BACKEND_BASE_URL", Self::DEFAULT_BASE_URL);
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_BASE_URL".to_string(), e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "BACKEND_BASE_URL".to_string(),
                "must be an absolute http(s) URL".to_string(),
            ));
        }
        let timeout_secs: u64 = parse_env(env, "BACKEND_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Design editor settings.
#[derive(Debug, Clone)]
pub struct DesignerConfig {
    /// Price charged for each custom t-shirt
    pub unit_price: Money,
    /// Largest artwork upload accepted, in bytes
    pub max_upload_bytes: u64,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            unit_price: Money::from_cents(15_000).unwrap_or_default(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
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
        Self::from_source(&EnvSource)
    }

    fn from_source(env: &impl Source) -> Result<Self, ConfigError> {
        let database_url = get_database_url(env, "STOREFRONT_DATABASE_URL")?;
        let host: IpAddr = parse_env(env, "STOREFRONT_HOST", IpAddr::from([127, 0, 0, 1]))?;
        let port: u16 = parse_env(env, "STOREFRONT_PORT", 3000)?;
        let base_url = get_required_env(env, "STOREFRONT_BASE_URL")?;

        let backend = BackendConfig::from_source(env)?;

        let defaults = DesignerConfig::default();
        let unit_price = match env.get("DESIGNER_UNIT_PRICE") {
            Some(raw) => Money::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("DESIGNER_UNIT_PRICE".to_string(), e.to_string())
            })?,
            None => defaults.unit_price,
        };
        let max_upload_bytes =
            parse_env(env, "DESIGNER_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            backend,
            designer: DesignerConfig {
                unit_price,
                max_upload_bytes,
            },
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env(env, "SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_env(env, "SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Session cookies are marked `Secure` when served over HTTPS.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Where configuration values come from. The process environment in
/// production, a map in tests.
trait Source {
    fn get(&self, key: &str) -> Option<String>;
}

struct EnvSource;

impl Source for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

/// Get a required environment variable.
fn get_required_env(env: &impl Source, key: &str) -> Result<String, ConfigError> {
    env.get(key)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(env: &impl Source, primary_key: &str) -> Result<SecretString, ConfigError> {
    env.get(primary_key)
        .or_else(|| env.get("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(env: &impl Source, key: &str, default: &str) -> String {
    env.get(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_env<T>(env: &impl Source, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env.get(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    struct MapSource(HashMap<&'static str, &'static str>);

    impl Source for MapSource {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| (*v).to_string())
        }
    }

    fn source(pairs: &[(&'static str, &'static str)]) -> MapSource {
        MapSource(pairs.iter().copied().collect())
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STOREFRONT_DATABASE_URL", "postgres://tee:pw@localhost/teeforge"),
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_source(&source(&minimal())).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.backend.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.backend.timeout, Duration::from_secs(30));
        assert_eq!(config.designer.unit_price.to_string(), "R150.00");
        assert_eq!(config.designer.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!config.is_https());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_base_url() {
        let err = StorefrontConfig::from_source(&source(&[(
            "STOREFRONT_DATABASE_URL",
            "postgres://localhost/db",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = StorefrontConfig::from_source(&source(&[
            ("DATABASE_URL", "postgres://fallback/db"),
            ("STOREFRONT_BASE_URL", "https://tees.example"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fallback/db");
        assert!(config.is_https());
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        for (key, value) in [
            ("STOREFRONT_PORT", "eighty"),
            ("BACKEND_BASE_URL", "not a url"),
            ("BACKEND_TIMEOUT_SECS", "-1"),
            ("DESIGNER_UNIT_PRICE", "-5"),
        ] {
            let mut pairs = minimal();
            pairs.push((key, value));
            let err = StorefrontConfig::from_source(&source(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == key),
                "{key}: {err}"
            );
        }
    }

    #[test]
    fn test_overrides() {
        let mut pairs = minimal();
        pairs.extend([
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8000"),
            ("BACKEND_BASE_URL", "https://api.tees.example/v1/"),
            ("BACKEND_TIMEOUT_SECS", "5"),
            ("DESIGNER_UNIT_PRICE", "29.99"),
        ]);
        let config = StorefrontConfig::from_source(&source(&pairs)).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
        assert_eq!(config.backend.base_url.as_str(), "https://api.tees.example/v1/");
        assert_eq!(config.backend.timeout, Duration::from_secs(5));
        assert_eq!(config.designer.unit_price.to_string(), "R29.99");
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = StorefrontConfig::from_source(&source(&minimal())).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("tee:pw"));
        assert!(debug_output.contains("localhost:8080"));
    }
}
