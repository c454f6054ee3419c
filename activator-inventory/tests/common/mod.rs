//! Shared helpers for inventory tests.

#![allow(dead_code)]

use activator_inventory::{CanonicalSigner, InventoryClient, InventoryConfig, ProductKeyList, ProductKeyObject};
use activator_types::KeyStatus;
use wiremock::MockServer;

pub const SECRET: &str = "test-shared-secret";

pub fn mock_config(server: &MockServer) -> InventoryConfig {
    InventoryConfig {
        api_url: format!("{}/api/productkeys", server.uri()),
        shared_secret: SECRET.to_string(),
        store: "Steam".to_string(),
        timeout_secs: 5,
    }
}

pub fn client_for(server: &MockServer) -> InventoryClient {
    InventoryClient::new(mock_config(server)).unwrap()
}

pub fn unknown_key(code: &str) -> ProductKeyObject {
    ProductKeyObject {
        store: "Steam".to_string(),
        product: None,
        key: code.to_string(),
        status: KeyStatus::Unknown,
    }
}

/// Builds a signed success envelope listing `keys`.
pub fn signed_listing(keys: &[ProductKeyObject]) -> serde_json::Value {
    let token = CanonicalSigner::new(SECRET).sign(&ProductKeyList(keys));
    serde_json::json!({
        "isSuccess": true,
        "productKeys": keys,
        "hmacToken": token,
    })
}
