//! Data kept in the admin's tower session.

pub mod session;

pub use session::{SESSION_SCHEMA_VERSION, cookies as cookie_names, keys as session_keys};
