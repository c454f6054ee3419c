//! Client for the remote product key inventory.
//!
//! The inventory hands out one key at a time and records the outcome of
//! each activation attempt. Every request carries an HMAC token computed
//! over a fixed-order canonical string of its fields, proving the caller
//! holds the shared secret; key listings may carry a token of their own,
//! which is checked before any key is trusted.
//!
//! # Canonical strings
//!
//! Fields are concatenated in a fixed per-message order with no
//! separators. Absent optional fields are left out entirely. This matches
//! the inventory service's implementation and must not change without a
//! coordinated server release.

mod client;
mod error;
mod models;
mod signer;

pub use client::{InventoryClient, InventoryConfig, KeyInventory, KeyUpdate};
pub use error::{InventoryError, InventoryResult};
pub use models::{
    ErrorResponse, GetProductKeyRequest, ProductKeyList, ProductKeyObject, ResponseEnvelope,
    UpdateProductKeyRequest,
};
pub use signer::{CanonicalSigner, Signable};
