use activator_types::{
    is_placeholder, require, Account, ConfigError, KeyStatus, ProductKey,
};

// ── Placeholders ─────────────────────────────────────────────────

#[test]
fn placeholder_values_detected() {
    assert!(is_placeholder("changeme"));
    assert!(is_placeholder("CHANGEME"));
    assert!(is_placeholder("  secret "));
    assert!(is_placeholder("<your shared secret>"));
    assert!(is_placeholder("${TOTP_SECRET}"));
}

#[test]
fn real_values_not_placeholders() {
    assert!(!is_placeholder("JBSWY3DPEHPK3PXP"));
    assert!(!is_placeholder("hunter22"));
    assert!(!is_placeholder("secretive-bot"));
}

#[test]
fn require_classifies_failures() {
    assert!(matches!(require("x", None), Err(ConfigError::Missing(_))));
    assert!(matches!(require("x", Some("   ")), Err(ConfigError::Missing(_))));
    assert!(matches!(
        require("x", Some("placeholder")),
        Err(ConfigError::Placeholder(_))
    ));
    assert!(require("x", Some("value")).is_ok());
}

// ── Account ──────────────────────────────────────────────────────

#[test]
fn account_debug_redacts_secrets() {
    let account = Account::new("bot", "hunter22", "JBSWY3DPEHPK3PXP").unwrap();
    let debug = format!("{account:?}");
    assert!(debug.contains("bot"));
    assert!(!debug.contains("hunter22"));
    assert!(!debug.contains("JBSWY3DPEHPK3PXP"));
}

#[test]
fn account_rejects_empty_password() {
    let err = Account::new("bot", "", "JBSWY3DPEHPK3PXP").unwrap_err();
    assert!(format!("{err}").contains("password"));
}

#[test]
fn account_rejects_placeholder_secret() {
    let err = Account::new("bot", "hunter22", "<totp>").unwrap_err();
    assert!(matches!(err, ConfigError::Placeholder(_)));
}

#[test]
fn account_identity_is_case_insensitive() {
    let account = Account::new("KeyBot", "hunter22", "JBSWY3DPEHPK3PXP").unwrap();
    assert!(account.is_identity("keybot"));
    assert!(account.is_identity(" KEYBOT\n"));
    assert!(!account.is_identity("otherbot"));
}

// ── KeyStatus ────────────────────────────────────────────────────

#[test]
fn status_wire_names() {
    assert_eq!(KeyStatus::UsedBySomeoneElse.to_string(), "UsedBySomeoneElse");
    assert_eq!(
        serde_json::to_string(&KeyStatus::RequiresBaseProduct).unwrap(),
        "\"RequiresBaseProduct\""
    );
}

#[test]
fn status_parse() {
    for status in KeyStatus::ALL {
        assert_eq!(status.as_str().parse::<KeyStatus>().unwrap(), status);
    }
    assert_eq!("regionlocked".parse::<KeyStatus>().unwrap(), KeyStatus::RegionLocked);
    assert!("Activated".parse::<KeyStatus>().is_err());
}

#[test]
fn only_unknown_is_selectable() {
    assert!(!KeyStatus::Unknown.is_terminal());
    for status in &KeyStatus::ALL[1..] {
        assert!(status.is_terminal());
    }
}

#[test]
fn new_key_is_unknown() {
    let key = ProductKey::new("ABCDE-FGHIJ", "Steam");
    assert_eq!(key.status, KeyStatus::Unknown);
    assert!(key.product.is_none());
    assert!(key.owner.is_none());
}
