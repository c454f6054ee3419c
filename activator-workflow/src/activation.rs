//! The per-run activation pipeline.

use crate::error::{ActivationError, ActivationResult, ActivatorError, ActivatorResult};
use crate::outcome::{classify, ActivationOutcome};
use activator_inventory::{KeyInventory, KeyUpdate};
use activator_session::{Locator, SessionAuthenticator, WebError, WebSession};
use activator_types::{KeyStatus, ProductKey, UNKNOWN};
use std::time::Duration;
use tracing::{debug, error, info, warn};

const OPERATION: &str = "KeyActivation";

/// Where the storefront keeps its key activation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationPage {
    pub url: String,
    pub key_input: Locator,
    /// Subscriber agreement checkbox.
    pub accept_agreement: Locator,
    pub submit: Locator,
    pub error_display: Locator,
    pub receipt: Locator,
    /// Product name line inside the receipt.
    pub product_name: Locator,
}

impl Default for ActivationPage {
    fn default() -> Self {
        Self {
            url: "https://store.steampowered.com/account/registerkey".to_string(),
            key_input: Locator::id("product_key"),
            accept_agreement: Locator::id("accept_ssa"),
            submit: Locator::id("register_btn"),
            error_display: Locator::id("error_display"),
            receipt: Locator::id("receipt_form"),
            product_name: Locator::css(".registerkey_lineitem"),
        }
    }
}

/// How a run ended without an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunReport {
    /// The outcome was recorded in the inventory.
    Reported { key: String, status: KeyStatus },
    /// The storefront refused to look at the key; nothing was recorded.
    RateLimited { key: String },
}

/// Translates an outcome into the inventory update that records it.
///
/// Returns `None` for outcomes that must leave the key untouched.
#[must_use]
pub fn update_for(outcome: &ActivationOutcome, code: &str, owner: &str) -> Option<KeyUpdate> {
    let unknown = || Some(UNKNOWN.to_string());
    let (status, product, owner) = match outcome {
        ActivationOutcome::Activated(name) => {
            (KeyStatus::Used, Some(name.clone()), Some(owner.to_string()))
        }
        ActivationOutcome::InvalidKey => (KeyStatus::Invalid, None, None),
        ActivationOutcome::UsedByOther => (KeyStatus::UsedBySomeoneElse, unknown(), unknown()),
        ActivationOutcome::AlreadyOwned => (KeyStatus::AlreadyOwned, unknown(), unknown()),
        ActivationOutcome::RequiresBaseProduct => {
            (KeyStatus::RequiresBaseProduct, unknown(), unknown())
        }
        ActivationOutcome::RegionLocked => (KeyStatus::RegionLocked, unknown(), unknown()),
        ActivationOutcome::RateLimited | ActivationOutcome::Unrecognized(_) => return None,
    };
    Some(KeyUpdate {
        code: code.to_string(),
        product,
        status,
        owner,
    })
}

/// Logs in, redeems one key and records what happened.
pub struct KeyActivationWorkflow<I> {
    authenticator: SessionAuthenticator,
    inventory: I,
    page: ActivationPage,
    element_timeout: Duration,
}

impl<I: KeyInventory> KeyActivationWorkflow<I> {
    pub fn new(authenticator: SessionAuthenticator, inventory: I) -> Self {
        Self {
            authenticator,
            inventory,
            page: ActivationPage::default(),
            element_timeout: Duration::from_secs(10),
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: ActivationPage) -> Self {
        self.page = page;
        self
    }

    /// How long to wait for the form and for its outcome.
    #[must_use]
    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    #[must_use]
    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    #[must_use]
    pub fn authenticator(&self) -> &SessionAuthenticator {
        &self.authenticator
    }

    /// Runs once, then closes the browser whatever the result.
    pub async fn run_and_quit<W: WebSession>(
        &mut self,
        web: &mut W,
    ) -> ActivatorResult<RunReport> {
        let result = self.run(web).await;
        if let Err(e) = web.quit().await {
            warn!("Failed to close the browser: {e}");
        }
        result
    }

    /// Runs the pipeline once. The browser is left open.
    pub async fn run<W: WebSession>(&mut self, web: &mut W) -> ActivatorResult<RunReport> {
        self.authenticator.authenticate(web).await?;

        let key = self.inventory.fetch_key(KeyStatus::Unknown).await?;

        let outcome = self.activate(web, &key).await?;
        info!(operation = OPERATION, key = %key.code, %outcome, "Activation finished");

        let owner = self.authenticator.account().username().to_string();
        match update_for(&outcome, &key.code, &owner) {
            Some(update) => {
                self.inventory.update_key(&update).await?;
                Ok(RunReport::Reported {
                    key: key.code,
                    status: update.status,
                })
            }
            None => match outcome {
                ActivationOutcome::Unrecognized(text) => {
                    error!(
                        operation = OPERATION,
                        key = %key.code,
                        text = %text,
                        "Unrecognized activation result, leaving the key untouched"
                    );
                    Err(ActivatorError::ActivationOutcome(ActivationError::Unrecognized(text)))
                }
                _ => {
                    warn!(
                        operation = OPERATION,
                        key = %key.code,
                        "Rate limited by the storefront, try again later"
                    );
                    Ok(RunReport::RateLimited { key: key.code })
                }
            },
        }
    }

    /// Submits `key` and classifies the page's answer.
    pub async fn activate<W: WebSession>(
        &self,
        web: &mut W,
        key: &ProductKey,
    ) -> ActivationResult<ActivationOutcome> {
        info!(operation = OPERATION, key = %key.code, "Activating product key");

        web.go_to(&self.page.url).await?;
        if !web
            .wait_for_visible(&self.page.key_input, self.element_timeout)
            .await?
        {
            return Err(ActivationError::Web(WebError::ElementNotFound(
                self.page.key_input.to_string(),
            )));
        }

        web.set_text(&self.page.key_input, &key.code).await?;
        web.set_checkbox(&self.page.accept_agreement, true).await?;
        web.click(&self.page.submit).await?;

        let shown = web
            .wait_for_any(
                &[&self.page.error_display, &self.page.receipt],
                self.element_timeout,
            )
            .await?;
        match shown {
            Some(0) => {
                let text = web.text(&self.page.error_display).await?;
                debug!(operation = OPERATION, key = %key.code, text = %text, "Activation error shown");
                Ok(classify(&text))
            }
            Some(_) => Ok(ActivationOutcome::Activated(
                self.product_name(web, key).await?,
            )),
            None => {
                error!(operation = OPERATION, key = %key.code, "No activation outcome appeared");
                Err(ActivationError::NoOutcome)
            }
        }
    }

    async fn product_name<W: WebSession>(
        &self,
        web: &mut W,
        key: &ProductKey,
    ) -> ActivationResult<String> {
        let name = if web.is_visible(&self.page.product_name).await? {
            web.text(&self.page.product_name).await?.trim().to_string()
        } else {
            String::new()
        };
        if name.is_empty() {
            warn!(
                operation = OPERATION,
                key = %key.code,
                "Receipt shows no product name"
            );
            return Ok(UNKNOWN.to_string());
        }
        Ok(name)
    }
}
