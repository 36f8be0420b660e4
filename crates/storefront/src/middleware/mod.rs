//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Path normalization (trailing slash)
//! 2. Sentry layers (hub per request, HTTP transaction)
//! 3. CORS for the frontend origin
//! 4. `TraceLayer` (request span with `request_id`)
//! 5. Request ID
//! 6. Session layer (tower-sessions with `PostgreSQL` store)
//! 7. Rate limiting on account routes (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAuth, clear_current_user, set_current_user};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
