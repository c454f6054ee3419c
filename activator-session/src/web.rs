//! The browser capability used by login and key activation.

use crate::cookie::Cookie;
use crate::error::WebResult;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// How to find an element on the current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Element `id` attribute.
    Id(String),
    /// CSS selector.
    Css(String),
    /// XPath expression.
    XPath(String),
}

impl Locator {
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Returns the W3C WebDriver `(using, value)` pair.
    #[must_use]
    pub fn to_webdriver(&self) -> (&'static str, String) {
        match self {
            Self::Id(id) => ("css selector", format!("[id=\"{id}\"]")),
            Self::Css(selector) => ("css selector", selector.clone()),
            Self::XPath(expr) => ("xpath", expr.clone()),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Css(selector) => write!(f, "css:{selector}"),
            Self::XPath(expr) => write!(f, "xpath:{expr}"),
        }
    }
}

/// A single browser tab driven by the activator.
///
/// Every call blocks (asynchronously) until the browser answers. Waiting
/// for page content is done by polling [`WebSession::is_visible`].
#[async_trait]
pub trait WebSession: Send {
    /// Navigates to `url` and waits for the page load.
    async fn go_to(&mut self, url: &str) -> WebResult<()>;

    /// Returns true if the element exists and is displayed.
    async fn is_visible(&mut self, locator: &Locator) -> WebResult<bool>;

    /// Replaces the content of an input.
    async fn set_text(&mut self, locator: &Locator, text: &str) -> WebResult<()>;

    async fn click(&mut self, locator: &Locator) -> WebResult<()>;

    /// Ticks or unticks a checkbox, clicking only if it must change.
    async fn set_checkbox(&mut self, locator: &Locator, checked: bool) -> WebResult<()>;

    /// Returns the rendered text of an element.
    async fn text(&mut self, locator: &Locator) -> WebResult<String>;

    /// Returns every cookie visible to the current page.
    async fn cookies(&mut self) -> WebResult<Vec<Cookie>>;

    /// Clears the jar and installs `cookies`.
    async fn replace_cookies(&mut self, cookies: &[Cookie]) -> WebResult<()>;

    /// Closes the browser. Further calls fail.
    async fn quit(&mut self) -> WebResult<()>;

    /// Delay between visibility checks while waiting.
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(250)
    }

    /// Waits until one of `locators` is visible and returns its index.
    ///
    /// Locators are checked in order on each poll, so an earlier locator
    /// wins when several are visible. Returns `None` on timeout.
    async fn wait_for_any(
        &mut self,
        locators: &[&Locator],
        timeout: Duration,
    ) -> WebResult<Option<usize>> {
        let deadline = Instant::now() + timeout;
        loop {
            for (idx, locator) in locators.iter().enumerate() {
                if self.is_visible(locator).await? {
                    return Ok(Some(idx));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }

    /// Waits until `locator` is visible. Returns false on timeout.
    async fn wait_for_visible(&mut self, locator: &Locator, timeout: Duration) -> WebResult<bool> {
        Ok(self.wait_for_any(&[locator], timeout).await?.is_some())
    }
}
