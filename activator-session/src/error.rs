//! Error types for browser sessions, cookie persistence and login.

use crate::authenticator::AuthFailure;
use thiserror::Error;

/// Result type for browser operations.
pub type WebResult<T> = Result<T, WebError>;

/// Result type for cookie persistence.
pub type CookieStoreResult<T> = Result<T, CookieStoreError>;

/// Result type for login.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by a [`crate::WebSession`] backend.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("WebDriver request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The driver answered with a W3C error object.
    #[error("WebDriver error {error}: {message}")]
    WebDriver { error: String, message: String },

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("WebDriver protocol error: {0}")]
    Protocol(String),

    #[error("browser session already closed")]
    Closed,
}

/// Errors raised while reading or writing the cookie file.
#[derive(Debug, Error)]
pub enum CookieStoreError {
    #[error("cookie file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed cookie on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// A cookie cannot be written without corrupting the line format.
    #[error("cookie {name} cannot be stored: {reason}")]
    Unrepresentable { name: String, reason: String },
}

/// Errors raised while authenticating.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A classified login failure.
    #[error("authentication failed: {0}")]
    Auth(AuthFailure),

    #[error(transparent)]
    Web(#[from] WebError),

    #[error("second-factor replay guard I/O failed: {0}")]
    ReplayGuard(#[from] std::io::Error),
}

impl SessionError {
    /// Returns the classified reason, if this is a login failure.
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            SessionError::Auth(reason) => Some(reason),
            _ => None,
        }
    }
}
