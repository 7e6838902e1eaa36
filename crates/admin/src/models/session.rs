//! Keys and versions for data kept in the admin's tower session.

/// Session keys for admin authentication data.
pub mod keys {
    /// Canonical `{token, role}` record.
    pub const ADMIN_SESSION: &str = "admin_session";

    /// Legacy token key, read once during migration then deleted.
    pub const LEGACY_TOKEN: &str = "adminToken";

    /// Legacy role key, read once during migration then deleted.
    pub const LEGACY_ROLE: &str = "adminRole";

    /// Version stamp written once migration has run for this client.
    pub const SCHEMA_VERSION: &str = "session_schema_version";

    /// One-shot toast shown on the next rendered page.
    pub const FLASH: &str = "flash";
}

/// Cookie names written by the session store.
pub mod cookies {
    /// Mirror of the canonical record.
    pub const ADMIN_SESSION: &str = "admin_session";

    /// Legacy cookies deleted whenever the session is written or cleared.
    pub const LEGACY: [&str; 2] = ["adminToken", "adminRole"];
}

/// Current layout of the stored session.
///
/// Version 2 is a single canonical key; version 1 split token and role
/// across two keys.
pub const SESSION_SCHEMA_VERSION: u32 = 2;

/// Lifetime of the mirror cookie in seconds.
pub const MIRROR_COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;
