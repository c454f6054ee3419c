//! Second-factor replay guard.
//!
//! The storefront rejects a code that was already consumed, and a run
//! that submits one burns a login attempt. The last submitted code is
//! kept in a one-line file so the next run can tell when the clock has
//! not yet moved on to a fresh code.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the last used code inside the cache directory.
pub const LAST_CODE_FILE_NAME: &str = "last-steamguard-code.txt";

#[derive(Debug, Clone)]
pub struct ReplayGuard {
    path: PathBuf,
}

impl ReplayGuard {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn in_cache_dir(cache_dir: &Path) -> Self {
        Self::new(cache_dir.join(LAST_CODE_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the last recorded code, or `None` on the first run.
    pub fn last_code(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let code = normalize(&content);
                Ok((!code.is_empty()).then_some(code))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns true if `code` equals the last recorded code, ignoring case
    /// and surrounding whitespace.
    pub fn is_stale(&self, code: &str) -> io::Result<bool> {
        Ok(self
            .last_code()?
            .is_some_and(|last| last == normalize(code)))
    }

    /// Records `code` as the most recently submitted one.
    pub fn record(&self, code: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, normalize(code))
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}
