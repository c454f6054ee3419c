//! Wire models for the inventory API.

use crate::signer::Signable;
use activator_types::{KeyStatus, ProductKey};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Read request: select keys by status.
///
/// Signed over `store, product, key, owner, status, count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetProductKeyRequest {
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub status: KeyStatus,
    pub count: u32,
}

impl Signable for GetProductKeyRequest {
    fn signing_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Borrowed(self.store.as_str())),
            self.product.as_deref().map(Cow::Borrowed),
            self.key.as_deref().map(Cow::Borrowed),
            self.owner.as_deref().map(Cow::Borrowed),
            Some(Cow::Borrowed(self.status.as_str())),
            Some(Cow::Owned(self.count.to_string())),
        ]
    }
}

/// Write request: record the outcome for one key.
///
/// Signed over `store, product, key, owner, status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateProductKeyRequest {
    pub store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub status: KeyStatus,
}

impl Signable for UpdateProductKeyRequest {
    fn signing_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        vec![
            Some(Cow::Borrowed(self.store.as_str())),
            self.product.as_deref().map(Cow::Borrowed),
            Some(Cow::Borrowed(self.key.as_str())),
            self.owner.as_deref().map(Cow::Borrowed),
            Some(Cow::Borrowed(self.status.as_str())),
        ]
    }
}

/// Read request as sent on the query string.
#[derive(Debug, Serialize)]
pub(crate) struct SignedQuery<'a> {
    #[serde(flatten)]
    pub payload: &'a GetProductKeyRequest,
    pub hmac: &'a str,
}

/// Write request as sent in the JSON body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignedBody<'a> {
    #[serde(flatten)]
    pub payload: &'a UpdateProductKeyRequest,
    pub hmac_token: &'a str,
}

/// One key in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductKeyObject {
    pub store: String,
    #[serde(default)]
    pub product: Option<String>,
    pub key: String,
    pub status: KeyStatus,
}

impl From<ProductKeyObject> for ProductKey {
    fn from(obj: ProductKeyObject) -> Self {
        ProductKey {
            code: obj.key,
            store: obj.store,
            product: obj.product,
            owner: None,
            status: obj.status,
        }
    }
}

/// A key listing, signed over each key's `store, product, key, status` in
/// listing order.
#[derive(Debug, Clone, Copy)]
pub struct ProductKeyList<'a>(pub &'a [ProductKeyObject]);

impl Signable for ProductKeyList<'_> {
    fn signing_fields(&self) -> Vec<Option<Cow<'_, str>>> {
        self.0
            .iter()
            .flat_map(|k| {
                [
                    Some(Cow::Borrowed(k.store.as_str())),
                    k.product.as_deref().map(Cow::Borrowed),
                    Some(Cow::Borrowed(k.key.as_str())),
                    Some(Cow::Borrowed(k.status.as_str())),
                ]
            })
            .collect()
    }
}

/// Success or failure envelope returned by every endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_success: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_keys: Vec<ProductKeyObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hmac_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}
