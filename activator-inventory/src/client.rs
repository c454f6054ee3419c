//! HTTP client for the inventory API.

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    ErrorResponse, GetProductKeyRequest, ProductKeyList, ResponseEnvelope, SignedBody,
    SignedQuery, UpdateProductKeyRequest,
};
use crate::signer::CanonicalSigner;
use activator_types::{require, KeyStatus, ProductKey};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection settings for the inventory API.
#[derive(Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Endpoint serving both reads (GET) and writes (PUT).
    pub api_url: String,
    /// Secret shared with the inventory for request signing.
    pub shared_secret: String,
    /// Storefront the keys belong to.
    pub store: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            shared_secret: String::new(),
            store: "Steam".to_string(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("api_url", &self.api_url)
            .field("shared_secret", &"<redacted>")
            .field("store", &self.store)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// A status change for one key.
///
/// `product` and `owner` are left out of the request when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyUpdate {
    pub code: String,
    pub product: Option<String>,
    pub status: KeyStatus,
    pub owner: Option<String>,
}

/// Remote key inventory.
#[async_trait]
pub trait KeyInventory: Send + Sync {
    /// Hands out one key with the given status, chosen by the server.
    async fn fetch_key(&self, status: KeyStatus) -> InventoryResult<ProductKey>;

    /// Records the outcome of an activation attempt.
    async fn update_key(&self, update: &KeyUpdate) -> InventoryResult<()>;
}

/// Signed HTTP implementation of [`KeyInventory`].
///
/// Calls are never retried: the read endpoint assigns keys, so a silent
/// retry could consume two.
pub struct InventoryClient {
    config: InventoryConfig,
    signer: CanonicalSigner,
    client: Client,
}

impl InventoryClient {
    /// Creates a client after checking the URL and secret are filled in.
    pub fn new(config: InventoryConfig) -> InventoryResult<Self> {
        require("ProductKeyManagerSettings.ApiUrl", Some(&config.api_url))?;
        require(
            "ProductKeyManagerSettings.SharedSecretKey",
            Some(&config.shared_secret),
        )?;
        require("ProductKeyManagerSettings.StoreName", Some(&config.store))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            signer: CanonicalSigner::new(&config.shared_secret),
            config,
            client,
        })
    }

    #[must_use]
    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    /// Reads the response, separating transport from application failures.
    async fn read_envelope(&self, response: Response) -> InventoryResult<ResponseEnvelope> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InventoryError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            if body.trim().is_empty() {
                return Err(InventoryError::Transport(format!(
                    "Request failed with status code {} ({})",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )));
            }
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(InventoryError::Application(message));
        }

        if body.trim().is_empty() {
            return Ok(ResponseEnvelope::default());
        }

        let envelope: ResponseEnvelope = serde_json::from_str(&body)
            .map_err(|e| InventoryError::InvalidResponse(format!("malformed envelope: {e}")))?;

        if envelope.is_success == Some(false) {
            return Err(InventoryError::Application(
                envelope
                    .message
                    .unwrap_or_else(|| "unspecified failure".to_string()),
            ));
        }

        Ok(envelope)
    }

    fn check_listing(&self, envelope: &ResponseEnvelope) -> InventoryResult<()> {
        match envelope.hmac_token.as_deref() {
            Some(token) => {
                if self
                    .signer
                    .verify(&ProductKeyList(&envelope.product_keys), token)
                {
                    Ok(())
                } else {
                    Err(InventoryError::TamperedResponse)
                }
            }
            None => {
                debug!("Inventory listing carries no token, skipping verification");
                Ok(())
            }
        }
    }
}

fn log_failure(operation: &str, err: &InventoryError) {
    warn!(operation, kind = err.kind(), "Inventory call failed: {err}");
}

#[async_trait]
impl KeyInventory for InventoryClient {
    async fn fetch_key(&self, status: KeyStatus) -> InventoryResult<ProductKey> {
        info!(operation = "KeyRetrieval", %status, "Retrieving product key");

        let request = GetProductKeyRequest {
            store: self.config.store.clone(),
            product: None,
            key: None,
            owner: None,
            status,
            count: 1,
        };
        let hmac = self.signer.sign(&request);

        let result = async {
            let response = self
                .client
                .get(&self.config.api_url)
                .query(&SignedQuery {
                    payload: &request,
                    hmac: &hmac,
                })
                .send()
                .await
                .map_err(|e| InventoryError::Transport(format!("key request failed: {e}")))?;

            let envelope = self.read_envelope(response).await?;
            self.check_listing(&envelope)?;

            envelope
                .product_keys
                .into_iter()
                .next()
                .map(ProductKey::from)
                .ok_or(InventoryError::NoKeyAvailable(status))
        }
        .await;

        match &result {
            Ok(key) => debug!(operation = "KeyRetrieval", key = %key.code, "Product key retrieved"),
            Err(e) => log_failure("KeyRetrieval", e),
        }
        result
    }

    async fn update_key(&self, update: &KeyUpdate) -> InventoryResult<()> {
        info!(
            operation = "KeyUpdate",
            key = %update.code,
            status = %update.status,
            "Updating product key"
        );

        let request = UpdateProductKeyRequest {
            store: self.config.store.clone(),
            product: update.product.clone(),
            key: update.code.clone(),
            owner: update.owner.clone(),
            status: update.status,
        };
        let hmac_token = self.signer.sign(&request);

        let result = async {
            let response = self
                .client
                .put(&self.config.api_url)
                .json(&SignedBody {
                    payload: &request,
                    hmac_token: &hmac_token,
                })
                .send()
                .await
                .map_err(|e| InventoryError::Transport(format!("update request failed: {e}")))?;

            self.read_envelope(response).await.map(|_| ())
        }
        .await;

        match &result {
            Ok(()) => debug!(operation = "KeyUpdate", key = %update.code, "Product key updated"),
            Err(e) => log_failure("KeyUpdate", e),
        }
        result
    }
}
