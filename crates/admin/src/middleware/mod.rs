//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers
//! 2. `TraceLayer` (request span)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (tower-sessions, `PostgreSQL` store)
//! 6. Session cookies (mirror cookie jar for the session store)
//! 7. Route guard (`RequireAdmin` extractor on every page but the login form)

pub mod auth;
pub mod cookies;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{AdminContext, GuardOutcome, GuardRejection, LOGIN_PATH, RequireAdmin, guard_outcome};
pub use cookies::{SessionCookies, session_cookie_middleware};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
