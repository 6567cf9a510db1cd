// ── Runtime entry configuration ──
//
// These types describe *which* Gatus server to poll and *how often*. They
// never touch disk: the host (CLI, config crate) builds them and hands them
// in.

use std::time::Duration;

use gatus_api::DEFAULT_REQUEST_TIMEOUT;
use url::Url;

/// Integration domain, used in device identifiers.
pub const DOMAIN: &str = "gatus";

/// Default polling period.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(10);

/// One configured Gatus server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    /// Host-assigned identifier, stable for the lifetime of the entry.
    pub entry_id: String,
    /// Display name chosen by the user.
    pub title: String,
    /// Gatus root URL (e.g. `https://status.example.com`).
    pub url: Url,
    /// Verify the server's TLS certificate.
    pub verify_ssl: bool,
}

impl ConfigEntry {
    pub fn new(entry_id: impl Into<String>, title: impl Into<String>, url: Url, verify_ssl: bool) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: title.into(),
            url,
            verify_ssl,
        }
    }

    /// Deduplication key: the slug of the display name.
    pub fn unique_id(&self) -> String {
        slugify(&self.title)
    }

    /// Link to the Gatus detail page of one endpoint.
    pub fn endpoint_url(&self, key: &str) -> String {
        let base = self.url.as_str().trim_end_matches('/');
        format!("{base}/endpoints/{key}")
    }
}

/// Coordinator timing. The request deadline and the polling period are
/// independent so a slow request fails explicitly instead of overlapping
/// the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub update_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Lowercase `s`, collapse every run of non-alphanumerics into one `_`,
/// and trim underscores from both ends.
pub fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pending_sep = false;
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
