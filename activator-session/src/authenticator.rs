//! Storefront login as an explicit state machine.
//!
//! ```text
//! Unauthenticated ─► CredentialsSubmitted ─► AwaitingSecondFactor ─► Authenticated
//!        │                    │                        │
//!        └──────────────► Authenticated                └──────────► Failed
//! ```
//!
//! Every failure is classified as an [`AuthFailure`] and returned, never
//! panicked. Log events carry the account name but never the password,
//! the TOTP secret or a generated code.

use crate::cookie::Cookie;
use crate::cookie_store::CookieStore;
use crate::error::{SessionError, SessionResult};
use crate::login::LoginPage;
use crate::replay::ReplayGuard;
use crate::web::WebSession;
use activator_totp::TotpGenerator;
use activator_types::Account;
use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const OPERATION: &str = "SteamLogIn";

/// Why a login was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The browser is signed in, but as somebody else.
    WrongAccount { expected: String, actual: String },
    /// The storefront asked for a captcha.
    CaptchaRequired,
    /// The current code was already submitted by an earlier run.
    StaleCode,
    /// The storefront rejected the second-factor code.
    InvalidSecondFactor,
    /// No expected marker appeared in time.
    AuthenticationFailure,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::WrongAccount { expected, actual } => {
                write!(f, "wrong account (expected {expected}, signed in as {actual})")
            }
            AuthFailure::CaptchaRequired => f.write_str("captcha required"),
            AuthFailure::StaleCode => f.write_str("stale code"),
            AuthFailure::InvalidSecondFactor => f.write_str("invalid second factor"),
            AuthFailure::AuthenticationFailure => f.write_str("authentication failure"),
        }
    }
}

/// Position of the login state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    CredentialsSubmitted,
    AwaitingSecondFactor,
    Authenticated,
    Failed(AuthFailure),
}

/// An authenticated browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    pub cookies: Vec<Cookie>,
}

/// Drives a [`WebSession`] through the storefront login.
pub struct SessionAuthenticator {
    account: Account,
    totp: TotpGenerator,
    replay_guard: ReplayGuard,
    cookie_store: Option<CookieStore>,
    page: LoginPage,
    element_timeout: Duration,
    clock: fn() -> u64,
    history: Vec<AuthState>,
}

fn system_clock() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

impl SessionAuthenticator {
    pub fn new(account: Account, totp: TotpGenerator, replay_guard: ReplayGuard) -> Self {
        Self {
            account,
            totp,
            replay_guard,
            cookie_store: None,
            page: LoginPage::default(),
            element_timeout: Duration::from_secs(10),
            clock: system_clock,
            history: vec![AuthState::Unauthenticated],
        }
    }

    /// Restores cookies before login and saves them after a success.
    #[must_use]
    pub fn with_cookie_store(mut self, store: CookieStore) -> Self {
        self.cookie_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_page(mut self, page: LoginPage) -> Self {
        self.page = page;
        self
    }

    /// How long to wait for each marker.
    #[must_use]
    pub fn with_element_timeout(mut self, timeout: Duration) -> Self {
        self.element_timeout = timeout;
        self
    }

    /// Source of the unix time used for code generation.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &AuthState {
        // history always starts with Unauthenticated
        self.history.last().unwrap_or(&AuthState::Unauthenticated)
    }

    /// Every state visited by the last login, in order.
    #[must_use]
    pub fn history(&self) -> &[AuthState] {
        &self.history
    }

    fn transition(&mut self, next: AuthState) {
        debug!(
            operation = OPERATION,
            username = self.account.username(),
            from = ?self.state(),
            to = ?next,
            "Login state changed"
        );
        self.history.push(next);
    }

    fn fail(&mut self, reason: AuthFailure) -> SessionError {
        error!(
            operation = OPERATION,
            username = self.account.username(),
            reason = %reason,
            "Failed to log in"
        );
        self.transition(AuthState::Failed(reason.clone()));
        SessionError::Auth(reason)
    }

    /// Logs `web` in as the configured account.
    ///
    /// Reuses a signed-in browser when it belongs to the same account.
    /// The second-factor code is submitted at most once per code window
    /// across runs.
    pub async fn authenticate<W: WebSession>(
        &mut self,
        web: &mut W,
    ) -> SessionResult<Session> {
        self.history = vec![AuthState::Unauthenticated];
        info!(
            operation = OPERATION,
            username = self.account.username(),
            "Logging in"
        );

        self.restore_cookies(web).await?;

        web.go_to(&self.page.login_url).await?;
        let entry = web
            .wait_for_any(
                &[&self.page.avatar, &self.page.username_input],
                self.element_timeout,
            )
            .await?;
        match entry {
            Some(0) => return self.resume_signed_in(web).await,
            Some(_) => {}
            None => return Err(self.fail(AuthFailure::AuthenticationFailure)),
        }

        if web.is_visible(&self.page.captcha_input).await? {
            return Err(self.fail(AuthFailure::CaptchaRequired));
        }

        web.set_text(&self.page.username_input, self.account.username())
            .await?;
        web.set_text(&self.page.password_input, self.account.password())
            .await?;
        if web.is_visible(&self.page.remember_login).await? {
            web.set_checkbox(&self.page.remember_login, true).await?;
        }
        web.click(&self.page.sign_in_button).await?;
        self.transition(AuthState::CredentialsSubmitted);

        let challenge = web
            .wait_for_any(
                &[&self.page.avatar, &self.page.second_factor_input],
                self.element_timeout,
            )
            .await?;
        match challenge {
            Some(0) => {
                debug!(operation = OPERATION, "No second factor requested");
                return self.finish(web).await;
            }
            Some(_) => self.transition(AuthState::AwaitingSecondFactor),
            None => return Err(self.fail(AuthFailure::AuthenticationFailure)),
        }

        let now = (self.clock)();
        let code = self.totp.generate_at(now);
        if self.replay_guard.is_stale(&code)? {
            warn!(
                operation = OPERATION,
                username = self.account.username(),
                retry_in_secs = self.totp.seconds_remaining(now),
                "The current second-factor code was already used"
            );
            return Err(self.fail(AuthFailure::StaleCode));
        }

        web.set_text(&self.page.second_factor_input, &code).await?;
        web.click(&self.page.second_factor_submit).await?;
        self.replay_guard.record(&code)?;

        let verdict = web
            .wait_for_any(
                &[&self.page.incorrect_code_message, &self.page.avatar],
                self.element_timeout,
            )
            .await?;
        match verdict {
            Some(0) => Err(self.fail(AuthFailure::InvalidSecondFactor)),
            Some(_) => self.finish(web).await,
            None => Err(self.fail(AuthFailure::AuthenticationFailure)),
        }
    }

    async fn resume_signed_in<W: WebSession>(
        &mut self,
        web: &mut W,
    ) -> SessionResult<Session> {
        let actual = web.text(&self.page.account_name).await?;
        if !self.account.is_identity(&actual) {
            return Err(self.fail(AuthFailure::WrongAccount {
                expected: self.account.username().to_string(),
                actual: actual.trim().to_string(),
            }));
        }
        info!(
            operation = OPERATION,
            username = self.account.username(),
            "Already logged in"
        );
        self.finish(web).await
    }

    async fn finish<W: WebSession>(&mut self, web: &mut W) -> SessionResult<Session> {
        self.transition(AuthState::Authenticated);
        info!(
            operation = OPERATION,
            username = self.account.username(),
            "Logged in"
        );

        let cookies = web.cookies().await?;
        if let Some(store) = &self.cookie_store {
            if let Err(e) = store.save(&cookies) {
                warn!(operation = "CookieSaving", "Failed to save cookies: {e}");
            }
        }

        Ok(Session {
            authenticated: true,
            cookies,
        })
    }

    async fn restore_cookies<W: WebSession>(&self, web: &mut W) -> SessionResult<()> {
        let Some(store) = &self.cookie_store else {
            return Ok(());
        };
        let cookies = match store.load() {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!(
                    operation = "CookieLoading",
                    "Ignoring unreadable cookie file: {e}"
                );
                return Ok(());
            }
        };
        if cookies.is_empty() {
            return Ok(());
        }

        web.go_to(&self.page.home_url).await?;
        web.replace_cookies(&cookies).await?;
        debug!(
            operation = "CookieLoading",
            count = cookies.len(),
            "Restored cookies"
        );
        Ok(())
    }
}
