//! Inventory client error types.

use activator_types::{ConfigError, KeyStatus};
use thiserror::Error;

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur talking to the inventory.
///
/// Callers treat every variant as the same remote failure; the variants
/// exist so the log can say which side of the wire went wrong.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The request never got a usable HTTP answer (connection failure or a
    /// non-2xx status without an error body).
    #[error("inventory transport failure: {0}")]
    Transport(String),

    /// The inventory answered with a structured error payload.
    #[error("inventory rejected the request: {0}")]
    Application(String),

    #[error("inventory has no key with status {0}")]
    NoKeyAvailable(KeyStatus),

    #[error("invalid inventory response: {0}")]
    InvalidResponse(String),

    /// The response token does not match its contents.
    #[error("inventory response failed signature verification")]
    TamperedResponse,

    #[error("invalid inventory configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl InventoryError {
    /// Returns true if the failure happened below the application layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, InventoryError::Transport(_) | InventoryError::Http(_))
    }

    /// Short label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryError::Transport(_) | InventoryError::Http(_) => "transport",
            InventoryError::Application(_) => "application",
            InventoryError::NoKeyAvailable(_) => "empty",
            InventoryError::InvalidResponse(_) | InventoryError::TamperedResponse => "response",
            InventoryError::Config(_) => "config",
        }
    }
}
