//! Key activator
//!
//! Redeems one product key per invocation:
//! 1. Logs the bot account into the storefront (cookies, then credentials
//!    and a second-factor code)
//! 2. Takes a key from the inventory service and submits it
//! 3. Records the outcome in the inventory
//!
//! Usage:
//!   key-activator --config appsettings.json
//!
//! Needs a running chromedriver. SIGTERM and Ctrl-C close the browser
//! before exiting. Exits 0 when an outcome was recorded,
//! 75 when rate limited and 1 on any error.

use std::path::PathBuf;
use std::process::ExitCode;

use activator_cli::{
    drive_browser, exit_code, shutdown_signal, Settings, EXIT_FAILURE, EXIT_REPORTED,
};
use activator_inventory::InventoryClient;
use activator_session::{
    Browser, CookieStore, ReplayGuard, SessionAuthenticator, WebDriverConfig, WebDriverSession,
};
use activator_workflow::KeyActivationWorkflow;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "key-activator")]
#[command(about = "Redeems one product key and reports the outcome", version)]
struct Args {
    /// Path to the settings file
    #[arg(short, long, env = "ACTIVATOR_CONFIG", default_value = "appsettings.json")]
    config: PathBuf,

    /// WebDriver endpoint (chromedriver)
    #[arg(long, env = "ACTIVATOR_WEBDRIVER_URL", default_value = "http://localhost:9515")]
    webdriver_url: String,

    /// Show the browser window and log at debug level
    #[arg(long)]
    debug: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Log in and save the session cookies, then exit without taking a key
    #[arg(long)]
    dry_run_auth: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let settings = Settings::load(&args.config);
    let debug_mode = args.debug
        || settings
            .as_ref()
            .is_ok_and(|s| s.debug_settings.is_debug_mode);
    init_logging(args.verbose || debug_mode);

    match run(args, settings).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn run(args: Args, settings: activator_types::ConfigResult<Settings>) -> Result<u8> {
    let mut settings =
        settings.with_context(|| format!("failed to load {}", args.config.display()))?;
    settings.apply_overrides(|name| std::env::var(name).ok());
    if args.debug {
        settings.debug_settings.is_debug_mode = true;
    }
    settings.validate().context("invalid configuration")?;

    let account = settings.account()?;
    let cache_dir = settings.cache_dir();
    info!(
        username = account.username(),
        cache_dir = %cache_dir.display(),
        headless = settings.headless(),
        "Configuration loaded"
    );

    let authenticator =
        SessionAuthenticator::new(account, settings.totp()?, ReplayGuard::in_cache_dir(&cache_dir))
            .with_cookie_store(CookieStore::in_cache_dir(&cache_dir))
            .with_element_timeout(settings.element_timeout());

    let inventory = InventoryClient::new(settings.inventory_config())?;

    let driver = WebDriverConfig {
        url: args.webdriver_url,
        browser: Browser::Chrome,
        headless: settings.headless(),
        page_load_timeout: settings.page_load_timeout(),
    };
    let mut browser = WebDriverSession::start(&driver)
        .await
        .context("failed to start the browser")?;

    if args.dry_run_auth {
        let mut authenticator = authenticator;
        drive_browser(&mut browser, shutdown_signal(), move |web| {
            Box::pin(async move {
                authenticator.authenticate(web).await?;
                Ok::<_, anyhow::Error>(EXIT_REPORTED)
            })
        })
        .await
    } else {
        let mut workflow = KeyActivationWorkflow::new(authenticator, inventory)
            .with_element_timeout(settings.element_timeout());
        drive_browser(&mut browser, shutdown_signal(), move |web| {
            Box::pin(async move {
                let report = workflow.run_and_quit(web).await?;
                Ok::<_, anyhow::Error>(exit_code(&report))
            })
        })
        .await
    }
}
