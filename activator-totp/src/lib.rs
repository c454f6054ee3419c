//! Time-based one-time passwords (RFC 6238) for second-factor login.
//!
//! A code is a pure function of the shared secret and the current time
//! step; nothing here touches the clock except [`TotpGenerator::generate_now`].
//!
//! Two renderings of the truncated HMAC are supported:
//! - [`CodeFormat::Numeric`]: the standard zero-padded decimal code
//! - [`CodeFormat::Steam`]: five characters from the storefront's own
//!   second-factor alphabet

mod error;
mod generator;

pub use error::{TotpError, TotpResult};
pub use generator::{
    generate_code, CodeFormat, SecretEncoding, TotpConfig, TotpGenerator, STEAM_ALPHABET,
};
