//! Client for the Teeforge REST backend.
//!
//! # Architecture
//!
//! - The backend owns every record: users, customers, designs, placements,
//!   t-shirt orders and payments. The storefront keeps no local copies beyond
//!   the visitor's session.
//! - One shared `reqwest::Client` (JSON, configurable timeout). A clone made
//!   with [`BackendClient::with_token`] sends `Authorization: Bearer ...` on
//!   every request.
//! - Non-2xx responses become [`BackendError::Api`], carrying the backend's
//!   `message` field when the body has one.
//! - Payment instructions are cached with `moka` for 5 minutes, and the
//!   reachability shown in the designer for 30 seconds.
//!
//! # Example
//!
//! ```rust,ignore
//! use teeforge_storefront::backend::BackendClient;
//!
//! let backend = BackendClient::new(&config.backend)?;
//! let signed_in = backend.login("thandi", "secret").await?;
//! let client = backend.with_token(signed_in.token.clone());
//! let customers = client.list_customers().await?;
//! ```

mod auth;
mod customers;
mod design;
mod payments;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use teeforge_core::payment::PaymentInfo;

use crate::config::BackendConfig;

pub use design::{PlacementComponent, Position, Rotation, Scale};
pub use types::*;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network failure, timeout, or malformed HTTP.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status}{}", .message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default())]
    Api { status: u16, message: Option<String> },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A created record came back without its identifier.
    #[error("{0} not saved correctly")]
    MissingId(&'static str),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl BackendError {
    /// The human-readable message the backend supplied, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m),
            _ => None,
        }
    }

    /// Message for the shopper: the backend's own wording when present,
    /// otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.backend_message().unwrap_or(fallback).to_string()
    }

    /// HTTP status returned by the backend, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(_) | Self::Parse(_) | Self::MissingId(_) | Self::InvalidUrl(_) => None,
        }
    }
}

/// REST backend client.
///
/// Cheap to clone. Clones share the connection pool and caches.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
    token: Option<BearerToken>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    payment_info: Cache<(), PaymentInfo>,
    reachable: Cache<(), bool>,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("teeforge-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let payment_info = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let reachable = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(30))
            .build();

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.clone(),
                payment_info,
                reachable,
            }),
            token: None,
        })
    }

    /// A client that authenticates as the holder of `token`.
    #[must_use]
    pub fn with_token(&self, token: Option<BearerToken>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Check that the backend is reachable by listing stored positions.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend answers non-2xx.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<(), BackendError> {
        let url = self.url(&["position", "getAll"])?;
        self.send_empty(self.request(Method::GET, url)).await
    }

    /// Whether the last [`ping`](Self::ping) succeeded. The answer is shared by
    /// every clone and refreshed at most every 30 seconds.
    pub async fn is_reachable(&self) -> bool {
        self.inner
            .reachable
            .get_with((), async {
                match self.ping().await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!(error = %e, "Backend not reachable");
                        false
                    }
                }
            })
            .await
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| BackendError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "Backend request");
        let builder = self.inner.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Send a request and decode the JSON response body.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, BackendError> {
        let response = check(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(&self, builder: RequestBuilder) -> Result<(), BackendError> {
        check(builder.send().await?).await?;
        Ok(())
    }
}

/// Turn a non-success response into [`BackendError::Api`].
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull `message` out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: Url::parse(base).unwrap(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_segments() {
        let backend = client("http://localhost:8080");
        assert_eq!(
            backend.url(&["position", "read", "5"]).unwrap().as_str(),
            "http://localhost:8080/position/read/5"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let backend = client("https://api.tees.example/v1/");
        assert_eq!(
            backend.url(&["api", "customer"]).unwrap().as_str(),
            "https://api.tees.example/v1/api/customer"
        );
    }

    #[test]
    fn test_url_encodes_segments() {
        let backend = client("http://localhost:8080");
        assert_eq!(
            backend.url(&["files", "a b/c"]).unwrap().as_str(),
            "http://localhost:8080/files/a%20b%2Fc"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Invalid username or password"}"#).as_deref(),
            Some("Invalid username or password")
        );
        assert_eq!(error_message(r#"{"message":"  "}"#), None);
        assert_eq!(error_message(r#"{"error":"Bad Request"}"#), None);
        assert_eq!(error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_user_message_falls_back() {
        let with_message = BackendError::Api {
            status: 401,
            message: Some("Account locked".to_string()),
        };
        assert_eq!(with_message.user_message("Login failed"), "Account locked");
        assert_eq!(with_message.status(), Some(401));
        assert_eq!(with_message.to_string(), "API error: 401 - Account locked");

        let bare = BackendError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(bare.user_message("Login failed"), "Login failed");
        assert_eq!(bare.to_string(), "API error: 500");
        assert_eq!(
            BackendError::MissingId("Rotation").to_string(),
            "Rotation not saved correctly"
        );
    }

    #[test]
    fn test_with_token_shares_inner() {
        let backend = client("http://localhost:8080");
        let authed = backend.with_token(Some(BearerToken::new("abc")));
        assert!(Arc::ptr_eq(&backend.inner, &authed.inner));
        assert!(backend.token.is_none());
        assert!(authed.token.is_some());
    }
}
