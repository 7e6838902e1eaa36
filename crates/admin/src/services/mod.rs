//! Business logic services for admin.
//!
//! # Services
//!
//! - `session_store` - Persistence and migration of the admin session
//! - `auth` - Session lifecycle: validation, login, logout, bypass
//! - `queries` - Token-gated CRUD over the backend with list caching
//! - `flash` - One-shot toast messages

pub mod auth;
pub mod flash;
pub mod queries;
pub mod session_store;

pub use auth::{AdminAuthService, AuthMode, AuthState, BypassCredentials, LoginError};
pub use flash::{Flash, FlashLevel};
pub use queries::{AdminQueries, DashboardSummary, ErrorKind, QueryCache, QueryError};
pub use session_store::SessionStore;
