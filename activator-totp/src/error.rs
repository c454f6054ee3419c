//! Error types for code generation.

use activator_types::ConfigError;
use thiserror::Error;

/// Result type for TOTP operations.
pub type TotpResult<T> = Result<T, TotpError>;

/// Every failure here is a configuration problem: the secret or the code
/// parameters are unusable, so no code can ever be produced.
#[derive(Debug, Error)]
pub enum TotpError {
    #[error("TOTP secret is missing")]
    MissingSecret,

    #[error("TOTP secret is a placeholder value")]
    PlaceholderSecret,

    #[error("invalid TOTP secret: {0}")]
    InvalidSecret(String),

    #[error("unsupported code length {0} (expected 6 to 8 digits)")]
    InvalidDigits(u32),

    #[error("time step must be positive")]
    InvalidStep,
}

impl From<TotpError> for ConfigError {
    fn from(err: TotpError) -> Self {
        match err {
            TotpError::MissingSecret => ConfigError::Missing("TOTP secret".to_string()),
            TotpError::PlaceholderSecret => ConfigError::Placeholder("TOTP secret".to_string()),
            other => ConfigError::Invalid {
                field: "TOTP".to_string(),
                reason: other.to_string(),
            },
        }
    }
}
