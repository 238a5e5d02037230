//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layer (capture errors)
//! 2. CORS (configured origins only)
//! 3. Rate limiting (governor; a stricter limiter wraps the credential routes)
//! 4. `TraceLayer` (request tracing)
//! 5. Request ID (add unique ID to each request)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
