//! HOTP/TOTP derivation.

use crate::error::{TotpError, TotpResult};
use activator_types::is_placeholder;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use std::fmt;

type HmacSha1 = Hmac<Sha1>;

/// Character set of the storefront's second-factor codes.
pub const STEAM_ALPHABET: &[u8; 26] = b"23456789BCDFGHJKMNPQRTVWXY";

const STEAM_CODE_LEN: usize = 5;

/// How the truncated HMAC value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeFormat {
    /// Zero-padded decimal code of `digits` length.
    #[default]
    Numeric,
    /// Five alphanumeric characters from [`STEAM_ALPHABET`].
    Steam,
}

/// Text encoding of the shared secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretEncoding {
    /// RFC 4648 base32, as shown by authenticator apps.
    #[default]
    Base32,
    /// Standard base64, as stored in storefront mobile-authenticator exports.
    Base64,
}

/// Code generation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpConfig {
    /// Length of a time step in seconds.
    pub step_secs: u64,
    /// Number of digits for [`CodeFormat::Numeric`].
    pub digits: u32,
    pub format: CodeFormat,
    pub encoding: SecretEncoding,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            step_secs: 30,
            digits: 6,
            format: CodeFormat::Numeric,
            encoding: SecretEncoding::Base32,
        }
    }
}

impl TotpConfig {
    /// Parameters matching the storefront's mobile authenticator.
    #[must_use]
    pub fn steam() -> Self {
        Self {
            format: CodeFormat::Steam,
            encoding: SecretEncoding::Base64,
            ..Self::default()
        }
    }

    fn validate(&self) -> TotpResult<()> {
        if self.step_secs == 0 {
            return Err(TotpError::InvalidStep);
        }
        if self.format == CodeFormat::Numeric && !(6..=8).contains(&self.digits) {
            return Err(TotpError::InvalidDigits(self.digits));
        }
        Ok(())
    }
}

/// A decoded secret bound to its generation parameters.
#[derive(Clone)]
pub struct TotpGenerator {
    key: Vec<u8>,
    config: TotpConfig,
}

impl fmt::Debug for TotpGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TotpGenerator")
            .field("key", &"<redacted>")
            .field("config", &self.config)
            .finish()
    }
}

impl TotpGenerator {
    /// Decodes and validates `secret`.
    ///
    /// # Errors
    ///
    /// Fails if the secret is absent, empty, a placeholder, or not valid in
    /// the configured encoding, or if the parameters are out of range.
    pub fn new(secret: Option<&str>, config: TotpConfig) -> TotpResult<Self> {
        config.validate()?;

        let secret = secret.map(str::trim).unwrap_or_default();
        if secret.is_empty() {
            return Err(TotpError::MissingSecret);
        }
        if is_placeholder(secret) {
            return Err(TotpError::PlaceholderSecret);
        }

        let key = decode_secret(secret, config.encoding)?;
        if key.is_empty() {
            return Err(TotpError::MissingSecret);
        }

        Ok(Self { key, config })
    }

    #[must_use]
    pub fn config(&self) -> &TotpConfig {
        &self.config
    }

    /// Returns the code valid at `unix_secs`.
    #[must_use]
    pub fn generate_at(&self, unix_secs: u64) -> String {
        let value = truncate(&self.key, unix_secs / self.config.step_secs);
        match self.config.format {
            CodeFormat::Numeric => {
                let width = self.config.digits as usize;
                format!("{:0width$}", value % 10u32.pow(self.config.digits))
            }
            CodeFormat::Steam => render_steam(value),
        }
    }

    /// Returns the code valid right now.
    #[must_use]
    pub fn generate_now(&self) -> String {
        self.generate_at(unix_now())
    }

    /// Seconds until the code valid at `unix_secs` rolls over.
    #[must_use]
    pub fn seconds_remaining(&self, unix_secs: u64) -> u64 {
        self.config.step_secs - unix_secs % self.config.step_secs
    }
}

/// Derives the code for `secret` at `unix_secs` in one call.
pub fn generate_code(secret: &str, unix_secs: u64, config: TotpConfig) -> TotpResult<String> {
    Ok(TotpGenerator::new(Some(secret), config)?.generate_at(unix_secs))
}

fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

fn decode_secret(secret: &str, encoding: SecretEncoding) -> TotpResult<Vec<u8>> {
    match encoding {
        SecretEncoding::Base32 => {
            let normalized: String = secret
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '=' && *c != '-')
                .map(|c| c.to_ascii_uppercase())
                .collect();
            data_encoding::BASE32_NOPAD
                .decode(normalized.as_bytes())
                .map_err(|e| TotpError::InvalidSecret(format!("invalid base32: {e}")))
        }
        SecretEncoding::Base64 => BASE64
            .decode(secret)
            .map_err(|e| TotpError::InvalidSecret(format!("invalid base64: {e}"))),
    }
}

/// HMAC-SHA1 over the big-endian counter followed by RFC 4226 dynamic
/// truncation to 31 bits.
fn truncate(key: &[u8], counter: u64) -> u32 {
    let mut mac = match HmacSha1::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC accepts keys of any length"),
    };
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = usize::from(digest[digest.len() - 1] & 0x0f);
    u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ])
}

fn render_steam(mut value: u32) -> String {
    let radix = STEAM_ALPHABET.len() as u32;
    let mut code = String::with_capacity(STEAM_CODE_LEN);
    for _ in 0..STEAM_CODE_LEN {
        code.push(char::from(STEAM_ALPHABET[(value % radix) as usize]));
        value /= radix;
    }
    code
}
