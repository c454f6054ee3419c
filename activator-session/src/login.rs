//! Where the storefront keeps its login form.

use crate::web::Locator;

/// URLs and element locators used by the login flow.
///
/// The defaults describe the Steam storefront. Tests and alternative
/// layouts construct their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPage {
    /// Page visited before restoring cookies, so they land on the right domain.
    pub home_url: String,
    pub login_url: String,
    /// Visible only when signed in.
    pub avatar: Locator,
    /// Displays the signed-in account's name.
    pub account_name: Locator,
    pub username_input: Locator,
    pub password_input: Locator,
    /// Interactive challenge; its presence aborts the login.
    pub captcha_input: Locator,
    pub remember_login: Locator,
    pub sign_in_button: Locator,
    pub second_factor_input: Locator,
    pub second_factor_submit: Locator,
    pub incorrect_code_message: Locator,
}

impl Default for LoginPage {
    fn default() -> Self {
        Self {
            home_url: "https://store.steampowered.com".to_string(),
            login_url: "https://store.steampowered.com/login/?redir=&redir_ssl=1".to_string(),
            avatar: Locator::xpath("//a[contains(@class,'user_avatar')]"),
            account_name: Locator::id("account_pulldown"),
            username_input: Locator::id("input_username"),
            password_input: Locator::id("input_password"),
            captcha_input: Locator::id("input_captcha"),
            remember_login: Locator::id("remember_login"),
            sign_in_button: Locator::xpath("//*[@id='login_btn_signin']/button"),
            second_factor_input: Locator::id("twofactorcode_entry"),
            second_factor_submit: Locator::xpath(
                "//*[@id='login_twofactorauth_buttonset_entercode']/div[1]",
            ),
            incorrect_code_message: Locator::id("login_twofactorauth_message_incorrectcode"),
        }
    }
}
