//! REST backend checks.
//!
//! # Usage
//!
//! ```bash
//! tf-cli backend ping
//! ```
//!
//! # Environment Variables
//!
//! - `BACKEND_BASE_URL` - REST backend address (default: <http://localhost:8080>)
//! - `BACKEND_TIMEOUT_SECS` - Request timeout (default: 30)

use teeforge_storefront::backend::{BackendClient, BackendError};
use teeforge_storefront::config::{BackendConfig, ConfigError};
use thiserror::Error;

/// Errors from backend commands.
#[derive(Debug, Error)]
pub enum BackendCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Check that the backend answers.
///
/// # Errors
///
/// Returns `BackendCommandError` if the configuration is invalid or the
/// backend cannot be reached.
pub async fn ping() -> Result<(), BackendCommandError> {
    let config = BackendConfig::from_env()?;
    let client = BackendClient::new(&config)?;

    tracing::info!(url = %client.base_url(), "Pinging backend...");
    client.ping().await?;

    tracing::info!("Backend is reachable");
    Ok(())
}
