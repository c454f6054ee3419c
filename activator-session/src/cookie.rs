//! Browser cookies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cookie of a session's jar.
///
/// `expiry` is `None` for a session cookie. An expiry in the past is kept
/// as `Some`: the cookie is expired, not a session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub domain: String,
    pub name: String,
    pub value: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub expiry: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Creates a session cookie for `domain` at path `/`.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            secure: false,
            http_only: false,
            expiry: None,
        }
    }

    #[must_use]
    pub fn is_session(&self) -> bool {
        self.expiry.is_none()
    }

    /// Returns true if the cookie has an expiry at or before `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|exp| exp <= now)
    }
}
