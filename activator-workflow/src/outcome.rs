//! Classification of the activation page's answer.

use std::fmt;

/// What happened when a key was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Redeemed; carries the product's display name.
    Activated(String),
    InvalidKey,
    UsedByOther,
    AlreadyOwned,
    RequiresBaseProduct,
    RegionLocked,
    /// Too many recent attempts; the key was not looked at.
    RateLimited,
    /// Error text no rule recognizes.
    Unrecognized(String),
}

impl fmt::Display for ActivationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationOutcome::Activated(name) => write!(f, "activated {name}"),
            ActivationOutcome::InvalidKey => f.write_str("invalid key"),
            ActivationOutcome::UsedByOther => f.write_str("used by another account"),
            ActivationOutcome::AlreadyOwned => f.write_str("already owned"),
            ActivationOutcome::RequiresBaseProduct => f.write_str("requires base product"),
            ActivationOutcome::RegionLocked => f.write_str("region locked"),
            ActivationOutcome::RateLimited => f.write_str("rate limited"),
            ActivationOutcome::Unrecognized(text) => write!(f, "unrecognized: {text}"),
        }
    }
}

/// Storefront language a phrase belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    English,
    German,
}

/// Maps a phrase found in error text to an outcome.
#[derive(Debug)]
pub struct OutcomeRule {
    pub locale: Locale,
    /// Lower-case, single-spaced fragment of the error text.
    pub phrase: &'static str,
    pub outcome: ActivationOutcome,
}

const fn rule(locale: Locale, phrase: &'static str, outcome: ActivationOutcome) -> OutcomeRule {
    OutcomeRule {
        locale,
        phrase,
        outcome,
    }
}

/// Known error texts, tried top to bottom.
pub static RULES: &[OutcomeRule] = &[
    rule(
        Locale::English,
        "too many recent activation attempts",
        ActivationOutcome::RateLimited,
    ),
    rule(
        Locale::English,
        "activated by a different steam account",
        ActivationOutcome::UsedByOther,
    ),
    rule(
        Locale::English,
        "already owns the product",
        ActivationOutcome::AlreadyOwned,
    ),
    rule(
        Locale::English,
        "requires ownership of another product",
        ActivationOutcome::RequiresBaseProduct,
    ),
    rule(
        Locale::English,
        "is not available for purchase in this country",
        ActivationOutcome::RegionLocked,
    ),
    rule(Locale::English, "is not valid", ActivationOutcome::InvalidKey),
    rule(
        Locale::German,
        "zu viele aktivierungsversuche",
        ActivationOutcome::RateLimited,
    ),
    rule(
        Locale::German,
        "durch ein anderes steam-konto aktiviert",
        ActivationOutcome::UsedByOther,
    ),
    rule(
        Locale::German,
        "besitzt bereits",
        ActivationOutcome::AlreadyOwned,
    ),
    rule(
        Locale::German,
        "erfordert den besitz eines anderen produkts",
        ActivationOutcome::RequiresBaseProduct,
    ),
    rule(
        Locale::German,
        "in diesem land nicht erhältlich",
        ActivationOutcome::RegionLocked,
    ),
    rule(Locale::German, "ist ungültig", ActivationOutcome::InvalidKey),
];

/// Classifies the activation page's error text.
///
/// Matching ignores case and collapses whitespace runs. Text no rule
/// matches comes back as [`ActivationOutcome::Unrecognized`] with the
/// original text.
#[must_use]
pub fn classify(text: &str) -> ActivationOutcome {
    let normalized = normalize(text);
    RULES
        .iter()
        .find(|rule| normalized.contains(rule.phrase))
        .map(|rule| rule.outcome.clone())
        .unwrap_or_else(|| ActivationOutcome::Unrecognized(text.trim().to_string()))
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
