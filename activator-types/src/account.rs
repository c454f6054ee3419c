//! The bot account keys are redeemed on.

use crate::{ConfigResult, require};
use std::fmt;

/// Storefront credentials plus the shared second-factor secret.
///
/// Loaded once at startup and never mutated. `Debug` output redacts the
/// password and the TOTP secret so the account can be logged freely.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    username: String,
    password: String,
    totp_secret: String,
}

impl Account {
    /// Builds an account, rejecting missing or placeholder values.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        totp_secret: impl Into<String>,
    ) -> ConfigResult<Self> {
        let account = Self {
            username: username.into(),
            password: password.into(),
            totp_secret: totp_secret.into(),
        };
        require("username", Some(&account.username))?;
        require("password", Some(&account.password))?;
        require("TOTP secret", Some(&account.totp_secret))?;
        Ok(account)
    }

    /// Returns the storefront login name; also used as the key owner.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    #[must_use]
    pub fn totp_secret(&self) -> &str {
        &self.totp_secret
    }

    /// Returns true if `identity` names this account (case-insensitive).
    #[must_use]
    pub fn is_identity(&self, identity: &str) -> bool {
        identity.trim().eq_ignore_ascii_case(self.username.trim())
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("totp_secret", &"<redacted>")
            .finish()
    }
}
