//! Request ID middleware for request tracing and correlation.
//!
//! Every request carries an id that shows up in logs, in Sentry and in the
//! response, so a shopper's "something went wrong" can be traced to the
//! backend call that failed.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound id that is trusted as-is.
const MAX_INBOUND_ID_LEN: usize = 128;

/// Use the inbound `x-request-id` when it is a short printable token,
/// otherwise generate a UUID v4.
fn resolve_request_id(inbound: Option<&str>) -> String {
    inbound
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_INBOUND_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Tag the request with an id, record it on the span and the Sentry scope,
/// and echo it in the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok()),
    );

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_id_is_kept() {
        assert_eq!(resolve_request_id(Some("edge-42")), "edge-42");
    }

    #[test]
    fn test_missing_or_odd_ids_are_replaced() {
        for inbound in [None, Some(""), Some("has space"), Some(&*"x".repeat(200))] {
            let id = resolve_request_id(inbound);
            assert!(Uuid::parse_str(&id).is_ok(), "{inbound:?} -> {id}");
        }
    }
}
