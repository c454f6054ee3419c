//! Error types for activation and for the run as a whole.

use activator_inventory::InventoryError;
use activator_session::{AuthFailure, SessionError, WebError};
use activator_totp::TotpError;
use activator_types::ConfigError;
use thiserror::Error;

/// Result type for the activation step.
pub type ActivationResult<T> = Result<T, ActivationError>;

/// Result type for a whole run.
pub type ActivatorResult<T> = Result<T, ActivatorError>;

/// Errors raised while submitting a key.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// The page showed error text no rule recognizes. The key's status is
    /// unknown and must not be changed.
    #[error("unrecognized activation error text: {0:?}")]
    Unrecognized(String),

    /// Neither the error nor the receipt appeared in time.
    #[error("the activation page showed no outcome")]
    NoOutcome,

    #[error(transparent)]
    Web(#[from] WebError),
}

/// Why a run stopped.
///
/// Every variant is fatal to the run. None is retried; recovery is
/// running the process again.
#[derive(Debug, Error)]
pub enum ActivatorError {
    /// Credentials, secrets or endpoints are missing or placeholders.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("authentication failed: {0}")]
    Authentication(AuthFailure),

    #[error("key inventory error: {0}")]
    Remote(#[from] InventoryError),

    /// The activation result could not be established.
    #[error("activation outcome error: {0}")]
    ActivationOutcome(ActivationError),

    #[error("browser error: {0}")]
    Browser(#[from] WebError),

    /// Reading or writing the local second-factor state failed.
    #[error("local state I/O failed: {0}")]
    LocalState(#[from] std::io::Error),
}

impl From<SessionError> for ActivatorError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Auth(reason) => ActivatorError::Authentication(reason),
            SessionError::Web(e) => ActivatorError::Browser(e),
            SessionError::ReplayGuard(e) => ActivatorError::LocalState(e),
        }
    }
}

impl From<ActivationError> for ActivatorError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::Web(e) => ActivatorError::Browser(e),
            other => ActivatorError::ActivationOutcome(other),
        }
    }
}

impl From<TotpError> for ActivatorError {
    fn from(err: TotpError) -> Self {
        ActivatorError::Configuration(err.into())
    }
}
