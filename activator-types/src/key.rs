//! Product keys tracked by the remote inventory.
//!
//! A key is created server-side as [`KeyStatus::Unknown`] and moves to a
//! terminal status exactly once, after an activation attempt whose outcome
//! was recognized.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product name and owner recorded when the real value cannot be known.
pub const UNKNOWN: &str = "Unknown";

/// Status of a product key in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyStatus {
    /// Not yet tried.
    Unknown,
    /// Activated on the bot account.
    Used,
    /// Rejected by the storefront as malformed or nonexistent.
    Invalid,
    /// Already redeemed by another account.
    UsedBySomeoneElse,
    /// The bot account already owns the product.
    AlreadyOwned,
    /// Needs a base product the bot account does not own.
    RequiresBaseProduct,
    /// Cannot be activated from the bot account's region.
    RegionLocked,
}

impl KeyStatus {
    /// Every status, in declaration order.
    pub const ALL: [KeyStatus; 7] = [
        Self::Unknown,
        Self::Used,
        Self::Invalid,
        Self::UsedBySomeoneElse,
        Self::AlreadyOwned,
        Self::RequiresBaseProduct,
        Self::RegionLocked,
    ];

    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Used => "Used",
            Self::Invalid => "Invalid",
            Self::UsedBySomeoneElse => "UsedBySomeoneElse",
            Self::AlreadyOwned => "AlreadyOwned",
            Self::RequiresBaseProduct => "RequiresBaseProduct",
            Self::RegionLocked => "RegionLocked",
        }
    }

    /// Returns true once the key has a final disposition and must not be
    /// handed out again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown key status: {s}"))
    }
}

/// A product key as returned by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductKey {
    /// The activation code itself.
    pub code: String,
    /// Storefront the key belongs to.
    pub store: String,
    /// Product name, if known.
    pub product: Option<String>,
    /// Account that redeemed the key, if known.
    pub owner: Option<String>,
    pub status: KeyStatus,
}

impl ProductKey {
    /// Creates a fresh key with unknown product, owner and status.
    #[must_use]
    pub fn new(code: impl Into<String>, store: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            store: store.into(),
            product: None,
            owner: None,
            status: KeyStatus::Unknown,
        }
    }
}
