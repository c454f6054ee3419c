//! Browser session handling for the key activator.
//!
//! - [`WebSession`]: the capability the rest of the system drives a
//!   browser through, with a W3C WebDriver backend
//! - [`CookieStore`]: flat-file persistence of the session cookie jar
//! - [`ReplayGuard`]: remembers the last submitted second-factor code
//! - [`SessionAuthenticator`]: the storefront login state machine
//! - `testing`: a scripted browser for tests (`test-support` feature)
//!
//! # Login sequence
//!
//! 1. Restore saved cookies, then open the login page
//! 2. Already signed in: check the account identity and stop
//! 3. Refuse captcha challenges, submit username and password
//! 4. Wait for the second-factor prompt or the signed-in marker
//! 5. Submit a fresh TOTP code unless it matches the last one used
//! 6. Wait for the signed-in marker or the incorrect-code message

mod authenticator;
mod cookie;
mod cookie_store;
mod error;
mod login;
mod replay;
#[cfg(feature = "test-support")]
pub mod testing;
mod web;
mod webdriver;

pub use authenticator::{AuthFailure, AuthState, Session, SessionAuthenticator};
pub use cookie::Cookie;
pub use cookie_store::{format_cookies, parse_cookies, CookieStore, COOKIES_FILE_NAME};
pub use error::{
    CookieStoreError, CookieStoreResult, SessionError, SessionResult, WebError, WebResult,
};
pub use login::LoginPage;
pub use replay::{ReplayGuard, LAST_CODE_FILE_NAME};
pub use web::{Locator, WebSession};
pub use webdriver::{Browser, WebDriverConfig, WebDriverSession};
