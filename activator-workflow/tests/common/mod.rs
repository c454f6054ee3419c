//! Shared helpers for workflow tests.

#![allow(dead_code)]

use activator_inventory::{InventoryError, InventoryResult, KeyInventory, KeyUpdate};
use activator_session::{LoginPage, ReplayGuard, SessionAuthenticator};
use activator_totp::{TotpConfig, TotpGenerator};
use activator_types::{Account, KeyStatus, ProductKey};
use activator_workflow::{ActivationPage, KeyActivationWorkflow};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub use activator_session::testing::{Action, FakeWebSession};

pub const SECRET_B32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
pub const USERNAME: &str = "bot_account";

// ── Inventory ───────────────────────────────────────────────────

/// In-memory inventory holding at most one key.
#[derive(Default)]
pub struct FakeInventory {
    key: Option<ProductKey>,
    fail_updates: bool,
    pub fetches: Mutex<Vec<KeyStatus>>,
    pub updates: Mutex<Vec<KeyUpdate>>,
}

impl FakeInventory {
    pub fn with_key(code: &str) -> Self {
        Self {
            key: Some(ProductKey::new(code, "Steam")),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn recorded_updates(&self) -> Vec<KeyUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyInventory for FakeInventory {
    async fn fetch_key(&self, status: KeyStatus) -> InventoryResult<ProductKey> {
        self.fetches.lock().unwrap().push(status);
        self.key
            .clone()
            .ok_or(InventoryError::NoKeyAvailable(status))
    }

    async fn update_key(&self, update: &KeyUpdate) -> InventoryResult<()> {
        if self.fail_updates {
            return Err(InventoryError::Transport(
                "Request failed with status code 503 (Service Unavailable)".to_string(),
            ));
        }
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}

// ── Workflow setup ──────────────────────────────────────────────

pub fn workflow(cache_dir: &Path, inventory: FakeInventory) -> KeyActivationWorkflow<FakeInventory> {
    let account = Account::new(USERNAME, "hunter2-pass", SECRET_B32).unwrap();
    let totp = TotpGenerator::new(Some(SECRET_B32), TotpConfig::default()).unwrap();
    let authenticator =
        SessionAuthenticator::new(account, totp, ReplayGuard::in_cache_dir(cache_dir))
            .with_element_timeout(Duration::from_millis(50));
    KeyActivationWorkflow::new(authenticator, inventory)
        .with_element_timeout(Duration::from_millis(50))
}

/// A browser already signed in as the bot account, with the activation
/// form loaded on request.
pub fn signed_in_site() -> FakeWebSession {
    let login = LoginPage::default();
    let page = ActivationPage::default();
    FakeWebSession::new()
        .page(&login.login_url, &[&login.avatar, &login.account_name])
        .text(&login.account_name, USERNAME)
        .page(
            &page.url,
            &[&page.key_input, &page.accept_agreement, &page.submit],
        )
}

/// Submitting the form shows `text` in the error box.
pub fn site_with_error(text: &str) -> FakeWebSession {
    let page = ActivationPage::default();
    signed_in_site()
        .on_click(&page.submit, &[&page.error_display])
        .text(&page.error_display, text)
}

/// Submitting the form shows a receipt for `product`.
pub fn site_with_receipt(product: &str) -> FakeWebSession {
    let page = ActivationPage::default();
    signed_in_site()
        .on_click(&page.submit, &[&page.receipt, &page.product_name])
        .text(&page.product_name, product)
}
