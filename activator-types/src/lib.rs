//! Core type definitions for the key activator.
//!
//! This crate defines the types shared by every component:
//! - The bot account the keys are redeemed on
//! - Product keys and their status lifecycle
//! - Configuration errors raised before any browser or network activity

mod account;
mod key;

pub use account::Account;
pub use key::{KeyStatus, ProductKey, UNKNOWN};

/// Result type for configuration validation.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required value is absent or empty.
    #[error("missing configuration value: {0}")]
    Missing(String),

    /// A value still holds a template placeholder.
    #[error("configuration value {0} is a placeholder")]
    Placeholder(String),

    /// A value is present but unusable.
    #[error("invalid configuration value {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// The settings file could not be parsed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Well-known template values that must never reach the storefront or the
/// inventory service.
const PLACEHOLDERS: &[&str] = &[
    "changeme",
    "change-me",
    "placeholder",
    "secret",
    "your-totp-secret",
    "your-password",
    "todo",
    "xxx",
    "none",
    "null",
];

/// Returns true if `value` looks like an unfilled template value.
#[must_use]
pub fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    if (value.starts_with('<') && value.ends_with('>'))
        || (value.starts_with("${") && value.ends_with('}'))
    {
        return true;
    }
    PLACEHOLDERS
        .iter()
        .any(|p| value.eq_ignore_ascii_case(p))
}

/// Checks that a required configuration value is present and filled in.
pub fn require(field: &str, value: Option<&str>) -> ConfigResult<()> {
    match value.map(str::trim) {
        None | Some("") => Err(ConfigError::Missing(field.to_string())),
        Some(v) if is_placeholder(v) => Err(ConfigError::Placeholder(field.to_string())),
        Some(_) => Ok(()),
    }
}
