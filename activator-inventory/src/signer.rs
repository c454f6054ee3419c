//! Canonical-string HMAC signing.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::borrow::Cow;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// A message with a fixed signing order.
pub trait Signable {
    /// Returns the message's fields in signing order. `None` marks an
    /// absent optional field, which contributes nothing to the canonical
    /// string.
    fn signing_fields(&self) -> Vec<Option<Cow<'_, str>>>;
}

/// Computes and checks tokens with the secret shared with the inventory.
#[derive(Clone)]
pub struct CanonicalSigner {
    secret: Vec<u8>,
}

impl fmt::Debug for CanonicalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl CanonicalSigner {
    #[must_use]
    pub fn new(shared_secret: &str) -> Self {
        Self {
            secret: shared_secret.as_bytes().to_vec(),
        }
    }

    /// Concatenates the present fields of `payload` with no separators.
    #[must_use]
    pub fn canonical_string(payload: &impl Signable) -> String {
        payload.signing_fields().into_iter().flatten().collect()
    }

    /// Returns the base64 HMAC-SHA256 token for `payload`.
    #[must_use]
    pub fn sign(&self, payload: &impl Signable) -> String {
        BASE64.encode(self.mac(&Self::canonical_string(payload)).finalize().into_bytes())
    }

    /// Checks `token` against `payload` in constant time.
    #[must_use]
    pub fn verify(&self, payload: &impl Signable, token: &str) -> bool {
        let Ok(expected) = BASE64.decode(token.trim()) else {
            return false;
        };
        self.mac(&Self::canonical_string(payload))
            .verify_slice(&expected)
            .is_ok()
    }

    fn mac(&self, canonical: &str) -> HmacSha256 {
        let mut mac = match HmacSha256::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        };
        mac.update(canonical.as_bytes());
        mac
    }
}
