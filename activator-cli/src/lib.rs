//! Configuration and process-level helpers for the `key-activator` binary.

mod settings;

pub use settings::{
    BotSettings, CacheSettings, DebugSettings, ProductKeyManagerSettings, Settings,
    PASSWORD_ENV, SHARED_SECRET_ENV, TOTP_SECRET_ENV,
};

use activator_session::WebSession;
use activator_workflow::RunReport;
use anyhow::anyhow;
use std::future::Future;
use std::pin::Pin;
use tracing::{info, warn};

/// Exit status for a run whose outcome was recorded.
pub const EXIT_REPORTED: u8 = 0;
/// Exit status for any error.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status when the storefront rate-limited the attempt (`EX_TEMPFAIL`).
pub const EXIT_RATE_LIMITED: u8 = 75;

/// Maps a finished run to the process exit status.
#[must_use]
pub fn exit_code(report: &RunReport) -> u8 {
    match report {
        RunReport::Reported { .. } => EXIT_REPORTED,
        RunReport::RateLimited { .. } => EXIT_RATE_LIMITED,
    }
}

/// Work that drives the browser until it finishes.
pub type BrowserTask<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + 'a>>;

/// Runs `task` on `web` until it finishes or `shutdown` completes, then
/// closes the browser either way.
///
/// An interrupted task is dropped at its current await point and the
/// result is an error.
pub async fn drive_browser<W, T, F>(
    web: &mut W,
    shutdown: impl Future<Output = ()>,
    task: F,
) -> anyhow::Result<T>
where
    W: WebSession,
    F: FnOnce(&mut W) -> BrowserTask<'_, T>,
{
    let result = {
        let task = task(web);
        tokio::select! {
            result = task => result,
            () = shutdown => Err(anyhow!("interrupted")),
        }
    };

    // no-op when the task already closed it
    if let Err(e) = web.quit().await {
        warn!("Failed to close the browser: {e}");
    }
    result
}

/// Completes on SIGTERM or SIGINT (Ctrl-C elsewhere).
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
                info!("Received SIGINT, shutting down");
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl-C, shutting down");
    }
}
