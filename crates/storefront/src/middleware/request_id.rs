//! Request ID middleware for log and error correlation.
//!
//! Every request gets a UUID v4 unless an upstream proxy already assigned
//! one. The ID is recorded on the tracing span, tagged onto the Sentry
//! scope, and echoed in the response so a client-reported failure can be
//! matched to its server logs.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that ensures every request has a unique request ID.
///
/// An incoming `x-request-id` header is trusted as-is; otherwise a fresh
/// UUID v4 is generated. The ID travels three ways: into the current
/// tracing span, onto the Sentry scope as a tag, and back out on the
/// response headers.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

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
