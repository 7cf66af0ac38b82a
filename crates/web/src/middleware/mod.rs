//! HTTP middleware stack for the web client.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//! 4. Security headers

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalSession, RequireSession, SessionRejection, require_dashboard};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
