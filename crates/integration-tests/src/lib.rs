//! Integration tests for Showroom.
//!
//! # Running Tests
//!
//! ```bash
//! # Router tests against a mocked backend
//! cargo test -p showroom-integration-tests
//!
//! # Live checks against running servers
//! SITE_BASE_URL=http://localhost:3000 ADMIN_BASE_URL=http://localhost:3001 \
//!     cargo test -p showroom-integration-tests -- --ignored
//! ```
//!
//! # Test Files
//!
//! - `site_routes` - Public site router over a wiremock backend
//! - `admin_routes` - Admin router, guard and session handling
//! - `live` - Smoke tests against running servers (ignored by default)
