//! [`WebSession`] over the W3C WebDriver HTTP protocol.
//!
//! Talks to a running chromedriver or geckodriver. Each [`WebDriverSession`]
//! owns one browser session, created by [`WebDriverSession::start`] and
//! ended by [`WebSession::quit`].

use crate::cookie::Cookie;
use crate::error::{WebError, WebResult};
use crate::web::{Locator, WebSession};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Key under which WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Browser the driver should launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Firefox,
}

impl Browser {
    fn capabilities(self, headless: bool) -> Value {
        match self {
            Browser::Chrome => {
                let mut args = vec!["--disable-gpu", "--window-size=1280,1024"];
                if headless {
                    args.push("--headless=new");
                }
                json!({ "browserName": "chrome", "goog:chromeOptions": { "args": args } })
            }
            Browser::Firefox => {
                let args: Vec<&str> = if headless { vec!["-headless"] } else { Vec::new() };
                json!({ "browserName": "firefox", "moz:firefoxOptions": { "args": args } })
            }
        }
    }
}

/// Where the driver listens and how the browser is launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDriverConfig {
    /// Driver base URL, e.g. `http://localhost:9515`.
    pub url: String,
    pub browser: Browser,
    /// Launch without a visible window.
    pub headless: bool,
    /// Navigation timeout applied through the driver.
    pub page_load_timeout: Duration,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9515".to_string(),
            browser: Browser::Chrome,
            headless: true,
            page_load_timeout: Duration::from_secs(30),
        }
    }
}

/// Cookie as exchanged with the driver.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCookie {
    name: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(default)]
    secure: bool,
    #[serde(default)]
    http_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry: Option<i64>,
}

impl From<WireCookie> for Cookie {
    fn from(wire: WireCookie) -> Self {
        Cookie {
            domain: wire.domain.unwrap_or_default(),
            name: wire.name,
            value: wire.value,
            path: wire.path.unwrap_or_else(|| "/".to_string()),
            secure: wire.secure,
            http_only: wire.http_only,
            expiry: wire.expiry.and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

impl From<&Cookie> for WireCookie {
    fn from(cookie: &Cookie) -> Self {
        WireCookie {
            name: cookie.name.clone(),
            value: cookie.value.clone(),
            domain: (!cookie.domain.is_empty()).then(|| cookie.domain.clone()),
            path: Some(cookie.path.clone()),
            secure: cookie.secure,
            http_only: cookie.http_only,
            expiry: cookie.expiry.map(|exp| exp.timestamp()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

/// A live browser session.
pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    /// Opens a new browser session and applies the page load timeout.
    pub async fn start(config: &WebDriverConfig) -> WebResult<Self> {
        let client = Client::builder()
            .timeout(config.page_load_timeout + Duration::from_secs(30))
            .build()?;
        let base_url = config.url.trim_end_matches('/').to_string();

        info!(url = %base_url, browser = ?config.browser, headless = config.headless, "Starting browser session");

        let body = json!({
            "capabilities": {
                "alwaysMatch": config.browser.capabilities(config.headless)
            }
        });
        let value = send(&client, Method::POST, &format!("{base_url}/session"), Some(body)).await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| WebError::Protocol("new session response carries no sessionId".into()))?
            .to_string();

        let mut session = Self {
            client,
            base_url,
            session_id,
            closed: false,
        };

        let page_load_ms = u64::try_from(config.page_load_timeout.as_millis()).unwrap_or(u64::MAX);
        session
            .command(Method::POST, "timeouts", Some(json!({ "pageLoad": page_load_ms })))
            .await?;

        debug!(session = %session.session_id, "Browser session started");
        Ok(session)
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(&mut self, method: Method, path: &str, body: Option<Value>) -> WebResult<Value> {
        if self.closed {
            return Err(WebError::Closed);
        }
        let url = if path.is_empty() {
            format!("{}/session/{}", self.base_url, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.base_url, self.session_id, path)
        };
        send(&self.client, method, &url, body).await
    }

    /// Finds the first element matching `locator`, or `None`.
    async fn find(&mut self, locator: &Locator) -> WebResult<Option<String>> {
        let (using, value) = locator.to_webdriver();
        match self
            .command(
                Method::POST,
                "element",
                Some(json!({ "using": using, "value": value })),
            )
            .await
        {
            Ok(found) => found
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(|id| Some(id.to_string()))
                .ok_or_else(|| WebError::Protocol(format!("no element reference for {locator}"))),
            Err(WebError::WebDriver { error, .. }) if error == "no such element" => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn require(&mut self, locator: &Locator) -> WebResult<String> {
        self.find(locator)
            .await?
            .ok_or_else(|| WebError::ElementNotFound(locator.to_string()))
    }
}

async fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> WebResult<Value> {
    let request = client.request(method, url);
    // POST endpoints require a JSON body even when they take no parameters.
    let request = match body {
        Some(body) => request.json(&body),
        None => request,
    };
    let response = request.send().await?;
    let status = response.status();
    let mut payload: Value = response.json().await?;
    let value = payload
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null);

    if !status.is_success() || value.get("error").is_some() {
        let wire: WireError = serde_json::from_value(value).map_err(|_| {
            WebError::Protocol(format!("driver answered {status} without an error object"))
        })?;
        return Err(WebError::WebDriver {
            error: wire.error,
            message: wire.message,
        });
    }
    Ok(value)
}

#[async_trait]
impl WebSession for WebDriverSession {
    async fn go_to(&mut self, url: &str) -> WebResult<()> {
        debug!(url, "Navigating");
        self.command(Method::POST, "url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    async fn is_visible(&mut self, locator: &Locator) -> WebResult<bool> {
        let Some(element) = self.find(locator).await? else {
            return Ok(false);
        };
        match self
            .command(Method::GET, &format!("element/{element}/displayed"), None)
            .await
        {
            Ok(shown) => Ok(shown.as_bool().unwrap_or(false)),
            Err(WebError::WebDriver { error, .. }) if error == "stale element reference" => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn set_text(&mut self, locator: &Locator, text: &str) -> WebResult<()> {
        let element = self.require(locator).await?;
        self.command(Method::POST, &format!("element/{element}/clear"), Some(json!({})))
            .await?;
        self.command(
            Method::POST,
            &format!("element/{element}/value"),
            Some(json!({ "text": text })),
        )
        .await
        .map(|_| ())
    }

    async fn click(&mut self, locator: &Locator) -> WebResult<()> {
        let element = self.require(locator).await?;
        self.command(Method::POST, &format!("element/{element}/click"), Some(json!({})))
            .await
            .map(|_| ())
    }

    async fn set_checkbox(&mut self, locator: &Locator, checked: bool) -> WebResult<()> {
        let element = self.require(locator).await?;
        let selected = self
            .command(Method::GET, &format!("element/{element}/selected"), None)
            .await?
            .as_bool()
            .unwrap_or(false);
        if selected != checked {
            self.command(Method::POST, &format!("element/{element}/click"), Some(json!({})))
                .await?;
        }
        Ok(())
    }

    async fn text(&mut self, locator: &Locator) -> WebResult<String> {
        let element = self.require(locator).await?;
        let text = self
            .command(Method::GET, &format!("element/{element}/text"), None)
            .await?;
        text.as_str()
            .map(str::to_string)
            .ok_or_else(|| WebError::Protocol(format!("text of {locator} is not a string")))
    }

    async fn cookies(&mut self) -> WebResult<Vec<Cookie>> {
        let value = self.command(Method::GET, "cookie", None).await?;
        let wire: Vec<WireCookie> = serde_json::from_value(value)
            .map_err(|e| WebError::Protocol(format!("malformed cookie list: {e}")))?;
        Ok(wire.into_iter().map(Cookie::from).collect())
    }

    async fn replace_cookies(&mut self, cookies: &[Cookie]) -> WebResult<()> {
        self.command(Method::DELETE, "cookie", None).await?;
        for cookie in cookies {
            self.command(
                Method::POST,
                "cookie",
                Some(json!({ "cookie": WireCookie::from(cookie) })),
            )
            .await?;
        }
        Ok(())
    }

    async fn quit(&mut self) -> WebResult<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.command(Method::DELETE, "", None).await.map(|_| ());
        self.closed = true;
        match &result {
            Ok(()) => info!(session = %self.session_id, "Browser session closed"),
            Err(e) => warn!(session = %self.session_id, "Closing the browser failed: {e}"),
        }
        result
    }
}
