//! A scripted in-memory [`WebSession`] for tests.
//!
//! Enabled by the `test-support` feature.

use crate::cookie::Cookie;
use crate::error::{WebError, WebResult};
use crate::web::{Locator, WebSession};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Something the fake browser was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    GoTo(String),
    SetText(Locator, String),
    Click(Locator),
    SetCheckbox(Locator, bool),
    ReplaceCookies(Vec<Cookie>),
    Quit,
}

/// A scripted browser.
///
/// Navigating to a registered URL shows that page's elements; clicking a
/// registered element replaces what is visible. Everything else is inert.
#[derive(Default)]
pub struct FakeWebSession {
    pub visible: HashSet<Locator>,
    pub texts: HashMap<Locator, String>,
    pub jar: Vec<Cookie>,
    pub actions: Vec<Action>,
    pub closed: bool,
    pages: HashMap<String, Vec<Locator>>,
    reactions: HashMap<Locator, Vec<Locator>>,
}

impl FakeWebSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, shows: &[&Locator]) -> Self {
        self.pages
            .insert(url.to_string(), shows.iter().map(|l| (*l).clone()).collect());
        self
    }

    pub fn on_click(mut self, target: &Locator, shows: &[&Locator]) -> Self {
        self.reactions
            .insert(target.clone(), shows.iter().map(|l| (*l).clone()).collect());
        self
    }

    pub fn text(mut self, locator: &Locator, text: &str) -> Self {
        self.texts.insert(locator.clone(), text.to_string());
        self
    }

    pub fn cookies(mut self, jar: Vec<Cookie>) -> Self {
        self.jar = jar;
        self
    }

    pub fn urls_visited(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                Action::GoTo(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn typed_into(&self, locator: &Locator) -> Option<&str> {
        self.actions.iter().find_map(|a| match a {
            Action::SetText(l, text) if l == locator => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clicked(&self, locator: &Locator) -> bool {
        self.actions
            .iter()
            .any(|a| matches!(a, Action::Click(l) if l == locator))
    }

    fn ensure_open(&self) -> WebResult<()> {
        if self.closed { Err(WebError::Closed) } else { Ok(()) }
    }

    fn ensure_visible(&self, locator: &Locator) -> WebResult<()> {
        if self.visible.contains(locator) {
            Ok(())
        } else {
            Err(WebError::ElementNotFound(locator.to_string()))
        }
    }
}

#[async_trait]
impl WebSession for FakeWebSession {
    async fn go_to(&mut self, url: &str) -> WebResult<()> {
        self.ensure_open()?;
        self.actions.push(Action::GoTo(url.to_string()));
        if let Some(shows) = self.pages.get(url) {
            self.visible = shows.iter().cloned().collect();
        }
        Ok(())
    }

    async fn is_visible(&mut self, locator: &Locator) -> WebResult<bool> {
        self.ensure_open()?;
        Ok(self.visible.contains(locator))
    }

    async fn set_text(&mut self, locator: &Locator, text: &str) -> WebResult<()> {
        self.ensure_open()?;
        self.ensure_visible(locator)?;
        self.actions
            .push(Action::SetText(locator.clone(), text.to_string()));
        Ok(())
    }

    async fn click(&mut self, locator: &Locator) -> WebResult<()> {
        self.ensure_open()?;
        self.ensure_visible(locator)?;
        self.actions.push(Action::Click(locator.clone()));
        if let Some(shows) = self.reactions.get(locator) {
            self.visible = shows.iter().cloned().collect();
        }
        Ok(())
    }

    async fn set_checkbox(&mut self, locator: &Locator, checked: bool) -> WebResult<()> {
        self.ensure_open()?;
        self.ensure_visible(locator)?;
        self.actions
            .push(Action::SetCheckbox(locator.clone(), checked));
        Ok(())
    }

    async fn text(&mut self, locator: &Locator) -> WebResult<String> {
        self.ensure_open()?;
        self.ensure_visible(locator)?;
        self.texts
            .get(locator)
            .cloned()
            .ok_or_else(|| WebError::ElementNotFound(locator.to_string()))
    }

    async fn cookies(&mut self) -> WebResult<Vec<Cookie>> {
        self.ensure_open()?;
        Ok(self.jar.clone())
    }

    async fn replace_cookies(&mut self, cookies: &[Cookie]) -> WebResult<()> {
        self.ensure_open()?;
        self.actions.push(Action::ReplaceCookies(cookies.to_vec()));
        self.jar = cookies.to_vec();
        Ok(())
    }

    async fn quit(&mut self) -> WebResult<()> {
        self.actions.push(Action::Quit);
        self.closed = true;
        Ok(())
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(1)
    }
}
