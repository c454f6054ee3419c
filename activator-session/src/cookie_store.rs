//! Flat-file persistence of a session's cookie jar.
//!
//! One cookie per line, seven tab-separated fields:
//!
//! ```text
//! domain  httpOnly  path  secure  expiry  name  urlEncodedValue
//! ```
//!
//! Booleans are `TRUE`/`FALSE`, expiry is unix seconds with `0` for a
//! session cookie, and lines starting with `#` are comments.

use crate::cookie::Cookie;
use crate::error::{CookieStoreError, CookieStoreResult};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the cookie jar inside the cache directory.
pub const COOKIES_FILE_NAME: &str = "cookies.txt";

const FIELD_COUNT: usize = 7;
const HEADER: &str = "# Key activator cookie jar. Do not edit while a run is in progress.";

/// Reads and writes the cookie file.
#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard location inside `cache_dir`.
    #[must_use]
    pub fn in_cache_dir(cache_dir: &Path) -> Self {
        Self::new(cache_dir.join(COOKIES_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved jar. A missing file yields an empty jar.
    pub fn load(&self) -> CookieStoreResult<Vec<Cookie>> {
        info!(operation = "CookieLoading", path = %self.path.display(), "Loading cookies");

        if !self.path.exists() {
            warn!(
                operation = "CookieLoading",
                path = %self.path.display(),
                "The cookies file is missing"
            );
            return Ok(Vec::new());
        }

        let cookies = parse_cookies(&fs::read_to_string(&self.path)?)?;
        debug!(operation = "CookieLoading", count = cookies.len(), "Cookies loaded");
        Ok(cookies)
    }

    /// Saves `cookies`, replacing the file.
    ///
    /// An empty jar is not written, so a failed run cannot clobber a
    /// previously valid session. Returns whether the file was written.
    pub fn save(&self, cookies: &[Cookie]) -> CookieStoreResult<bool> {
        info!(operation = "CookieSaving", path = %self.path.display(), "Saving cookies");

        if cookies.is_empty() {
            warn!(operation = "CookieSaving", "There are no cookies to save");
            return Ok(false);
        }

        let content = format_cookies(cookies)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;

        debug!(operation = "CookieSaving", count = cookies.len(), "Cookies saved");
        Ok(true)
    }
}

/// Serializes a jar to the file format, header line included.
pub fn format_cookies(cookies: &[Cookie]) -> CookieStoreResult<String> {
    let mut out = String::from(HEADER);
    out.push('\n');

    for cookie in cookies {
        for (field, value) in [
            ("domain", &cookie.domain),
            ("name", &cookie.name),
            ("path", &cookie.path),
        ] {
            if value.contains(['\t', '\n', '\r']) {
                return Err(CookieStoreError::Unrepresentable {
                    name: cookie.name.clone(),
                    reason: format!("{field} contains a tab or line break"),
                });
            }
        }
        if cookie.domain.starts_with('#') {
            return Err(CookieStoreError::Unrepresentable {
                name: cookie.name.clone(),
                reason: "line would read back as a comment".to_string(),
            });
        }

        let expiry = match cookie.expiry {
            None => 0,
            Some(exp) if exp.timestamp() > 0 => exp.timestamp(),
            Some(_) => {
                return Err(CookieStoreError::Unrepresentable {
                    name: cookie.name.clone(),
                    reason: "expiry must be after the unix epoch".to_string(),
                });
            }
        };

        out.push_str(&format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            cookie.domain,
            format_bool(cookie.http_only),
            cookie.path,
            format_bool(cookie.secure),
            expiry,
            cookie.name,
            urlencoding::encode(&cookie.value),
        ));
    }

    Ok(out)
}

/// Parses the file format. Blank lines and `#` comments are skipped.
pub fn parse_cookies(content: &str) -> CookieStoreResult<Vec<Cookie>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|(idx, line)| parse_line(idx + 1, line.trim_end_matches('\r')))
        .collect()
}

fn parse_line(line_no: usize, line: &str) -> CookieStoreResult<Cookie> {
    let malformed = |reason: String| CookieStoreError::Malformed {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let http_only = parse_bool(fields[1])
        .ok_or_else(|| malformed(format!("bad httpOnly flag {:?}", fields[1])))?;
    let secure = parse_bool(fields[3])
        .ok_or_else(|| malformed(format!("bad secure flag {:?}", fields[3])))?;

    let seconds: i64 = fields[4]
        .trim()
        .parse()
        .map_err(|_| malformed(format!("bad expiry {:?}", fields[4])))?;
    let expiry = match seconds {
        0 => None,
        s if s > 0 => Some(
            DateTime::<Utc>::from_timestamp(s, 0)
                .ok_or_else(|| malformed(format!("expiry {s} out of range")))?,
        ),
        s => return Err(malformed(format!("negative expiry {s}"))),
    };

    let value = urlencoding::decode(fields[6])
        .map_err(|e| malformed(format!("bad value encoding: {e}")))?
        .into_owned();

    Ok(Cookie {
        domain: fields[0].to_string(),
        name: fields[5].to_string(),
        value,
        path: fields[2].to_string(),
        secure,
        http_only,
        expiry,
    })
}

fn format_bool(flag: bool) -> &'static str {
    if flag { "TRUE" } else { "FALSE" }
}

fn parse_bool(field: &str) -> Option<bool> {
    match field.trim() {
        f if f.eq_ignore_ascii_case("true") => Some(true),
        f if f.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
