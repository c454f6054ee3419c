//! `appsettings.json` loading, environment overrides and validation.
//!
//! ```json
//! {
//!   "BotSettings": {
//!     "PageLoadTimeout": 90,
//!     "ElementTimeout": 15,
//!     "SteamUsername": "bot_account",
//!     "SteamPassword": "...",
//!     "SteamGuardTotpKey": "..."
//!   },
//!   "ProductKeyManagerSettings": {
//!     "ApiUrl": "https://inventory.example/api/productkeys",
//!     "SharedSecretKey": "...",
//!     "StoreName": "Steam"
//!   },
//!   "CacheSettings": { "CacheDirectoryPath": "/var/cache/key-activator" },
//!   "DebugSettings": { "IsDebugMode": false }
//! }
//! ```

use activator_inventory::InventoryConfig;
use activator_session::{COOKIES_FILE_NAME, LAST_CODE_FILE_NAME};
use activator_totp::{TotpConfig, TotpGenerator};
use activator_types::{require, Account, ConfigError, ConfigResult};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides `BotSettings.SteamPassword`.
pub const PASSWORD_ENV: &str = "ACTIVATOR_PASSWORD";
/// Overrides `BotSettings.SteamGuardTotpKey`.
pub const TOTP_SECRET_ENV: &str = "ACTIVATOR_TOTP_SECRET";
/// Overrides `ProductKeyManagerSettings.SharedSecretKey`.
pub const SHARED_SECRET_ENV: &str = "ACTIVATOR_SHARED_SECRET";

/// Directory name under the platform cache directory.
const CACHE_DIR_NAME: &str = "key-activator";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Settings {
    pub bot_settings: BotSettings,
    pub product_key_manager_settings: ProductKeyManagerSettings,
    pub cache_settings: CacheSettings,
    pub debug_settings: DebugSettings,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BotSettings {
    /// Seconds.
    pub page_load_timeout: u64,
    /// Seconds.
    pub element_timeout: u64,
    pub steam_username: String,
    pub steam_password: String,
    /// Base64 shared secret of the storefront's mobile authenticator.
    pub steam_guard_totp_key: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            page_load_timeout: 90,
            element_timeout: 15,
            steam_username: String::new(),
            steam_password: String::new(),
            steam_guard_totp_key: String::new(),
        }
    }
}

impl fmt::Debug for BotSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotSettings")
            .field("page_load_timeout", &self.page_load_timeout)
            .field("element_timeout", &self.element_timeout)
            .field("steam_username", &self.steam_username)
            .field("steam_password", &"<redacted>")
            .field("steam_guard_totp_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProductKeyManagerSettings {
    pub api_url: String,
    pub shared_secret_key: String,
    pub store_name: String,
}

impl Default for ProductKeyManagerSettings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            shared_secret_key: String::new(),
            store_name: "Steam".to_string(),
        }
    }
}

impl fmt::Debug for ProductKeyManagerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductKeyManagerSettings")
            .field("api_url", &self.api_url)
            .field("shared_secret_key", &"<redacted>")
            .field("store_name", &self.store_name)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CacheSettings {
    pub cache_directory_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DebugSettings {
    /// Shows the browser window and raises the log level.
    pub is_debug_mode: bool,
}

impl Settings {
    /// Reads and parses a settings file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Invalid {
            field: path.display().to_string(),
            reason: format!("cannot read settings file: {e}"),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Replaces secrets with values from `lookup`, when it has them.
    ///
    /// `lookup` is normally [`std::env::var`]; empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(password) = get(PASSWORD_ENV) {
            self.bot_settings.steam_password = password;
        }
        if let Some(secret) = get(TOTP_SECRET_ENV) {
            self.bot_settings.steam_guard_totp_key = secret;
        }
        if let Some(secret) = get(SHARED_SECRET_ENV) {
            self.product_key_manager_settings.shared_secret_key = secret;
        }
    }

    /// Checks every value a run needs.
    pub fn validate(&self) -> ConfigResult<()> {
        let bot = &self.bot_settings;
        require("BotSettings.SteamUsername", Some(&bot.steam_username))?;
        require("BotSettings.SteamPassword", Some(&bot.steam_password))?;
        require("BotSettings.SteamGuardTotpKey", Some(&bot.steam_guard_totp_key))?;
        for (field, secs) in [
            ("BotSettings.PageLoadTimeout", bot.page_load_timeout),
            ("BotSettings.ElementTimeout", bot.element_timeout),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "must be at least one second".to_string(),
                });
            }
        }

        let pkm = &self.product_key_manager_settings;
        require("ProductKeyManagerSettings.ApiUrl", Some(&pkm.api_url))?;
        if !(pkm.api_url.starts_with("http://") || pkm.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "ProductKeyManagerSettings.ApiUrl".to_string(),
                reason: "must be an http(s) URL".to_string(),
            });
        }
        require(
            "ProductKeyManagerSettings.SharedSecretKey",
            Some(&pkm.shared_secret_key),
        )?;
        require("ProductKeyManagerSettings.StoreName", Some(&pkm.store_name))?;

        self.totp()?;
        Ok(())
    }

    pub fn account(&self) -> ConfigResult<Account> {
        let bot = &self.bot_settings;
        Account::new(
            bot.steam_username.trim(),
            bot.steam_password.clone(),
            bot.steam_guard_totp_key.trim(),
        )
    }

    /// Generator for the storefront's five-character codes.
    pub fn totp(&self) -> ConfigResult<TotpGenerator> {
        Ok(TotpGenerator::new(
            Some(self.bot_settings.steam_guard_totp_key.trim()),
            TotpConfig::steam(),
        )?)
    }

    #[must_use]
    pub fn inventory_config(&self) -> InventoryConfig {
        let pkm = &self.product_key_manager_settings;
        InventoryConfig {
            api_url: pkm.api_url.trim().to_string(),
            shared_secret: pkm.shared_secret_key.clone(),
            store: pkm.store_name.trim().to_string(),
            ..InventoryConfig::default()
        }
    }

    /// Configured cache directory, or the platform cache directory.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache_settings.cache_directory_path {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join(CACHE_DIR_NAME),
        }
    }

    #[must_use]
    pub fn cookies_path(&self) -> PathBuf {
        self.cache_dir().join(COOKIES_FILE_NAME)
    }

    #[must_use]
    pub fn last_code_path(&self) -> PathBuf {
        self.cache_dir().join(LAST_CODE_FILE_NAME)
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.bot_settings.page_load_timeout)
    }

    #[must_use]
    pub fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.bot_settings.element_timeout)
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        !self.debug_settings.is_debug_mode
    }
}
