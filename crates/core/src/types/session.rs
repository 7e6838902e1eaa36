//! The admin session issued by the backend service.
//!
//! A session is the pair `(token, role)` returned by `adminLogin`. It is only
//! meaningful when both halves are present: a token without a role (or the
//! reverse) is treated exactly like no session at all, so the constructor and
//! the `Deserialize` impl both refuse to build one.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque credential presented on privileged backend calls.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token. Returns `None` for an empty or blank string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw token, for sending to the backend.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First and last four characters, for display on the profile page.
    #[must_use]
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "••••".to_string();
        }
        let head: String = chars.iter().take(4).collect();
        let tail: String = chars.iter().skip(chars.len() - 4).collect();
        format!("{head}…{tail}")
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}

/// An authenticated admin session: token plus role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSession")]
pub struct AdminSession {
    token: SessionToken,
    role: String,
}

impl AdminSession {
    /// Build a session, enforcing that both token and role are non-empty.
    #[must_use]
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Option<Self> {
        let token = SessionToken::new(token)?;
        let role = role.into();
        if role.is_empty() {
            return None;
        }
        Some(Self { token, role })
    }

    /// The session token.
    #[must_use]
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    /// The role string reported by the backend.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }
}

/// Wire shape of a stored or returned session before validation.
#[derive(Deserialize)]
struct RawSession {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

/// Error returned when a stored session is missing one of its halves.
#[derive(Debug, thiserror::Error)]
#[error("session requires a non-empty token and role")]
pub struct IncompleteSession;

impl TryFrom<RawSession> for AdminSession {
    type Error = IncompleteSession;

    fn try_from(raw: RawSession) -> Result<Self, Self::Error> {
        Self::new(raw.token.unwrap_or_default(), raw.role.unwrap_or_default())
            .ok_or(IncompleteSession)
    }
}
