// Gatus API HTTP client
//
// Two fixed GET endpoints, a per-request deadline, and classification of
// every transport failure into the closed `Error` taxonomy. The client is
// stateless between calls: it only holds the base URL, the certificate
// policy, and a handle to the shared transport.

use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, ErrorKind};
use crate::models::{RawEndpoint, ServerConfig, StatusSnapshot};
use crate::transport::Transport;

/// Server capability probe.
pub const CONFIG_PATH: &str = "api/v1/config";
/// Per-endpoint result histories.
pub const STATUSES_PATH: &str = "api/v1/endpoints/statuses";

/// Deadline applied to every request unless overridden.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for a single Gatus server.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    base_url: Url,
    verify_ssl: bool,
    timeout: Duration,
}

impl StatusClient {
    /// Create a client for `base_url` (the Gatus root, e.g.
    /// `https://status.example.com`) using the shared transport.
    pub fn new(base_url: Url, verify_ssl: bool, transport: &Transport) -> Self {
        Self {
            http: transport.client(verify_ssl).clone(),
            base_url,
            verify_ssl,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Probe the server's auth configuration.
    ///
    /// `GET /api/v1/config`. Missing fields default to `false`.
    pub async fn fetch_config(&self) -> Result<ServerConfig, Error> {
        self.get(CONFIG_PATH).await
    }

    /// Fetch the current status of every monitored endpoint.
    ///
    /// `GET /api/v1/endpoints/statuses`. Each endpoint's status is taken
    /// from the last entry of its `results` history.
    pub async fn fetch_statuses(&self) -> Result<StatusSnapshot, Error> {
        let raw: Vec<RawEndpoint> = self.get(STATUSES_PATH).await?;
        let snapshot = StatusSnapshot::from_raw(raw);
        debug!(endpoints = snapshot.len(), "fetched endpoint statuses");
        Ok(snapshot)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Build `{base}/{path}`, ignoring a trailing slash on the base.
    pub fn api_url(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.api_url(path);
        debug!("GET {url}");

        let resp = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify(path, &e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(Error::new(
                ErrorKind::Unknown,
                path,
                format!("HTTP {status}: {preview}"),
            ));
        }

        let body = resp.bytes().await.map_err(|e| classify(path, &e))?;
        trace!(bytes = body.len(), "response body received");

        serde_json::from_slice(&body).map_err(|e| {
            let preview: String = String::from_utf8_lossy(&body).chars().take(200).collect();
            Error::new(
                ErrorKind::Unknown,
                path,
                format!("invalid JSON: {e} (body preview: {preview:?})"),
            )
        })
    }
}

// ── Failure classification ──────────────────────────────────────────

/// Map a `reqwest` failure onto the closed taxonomy.
///
/// Most specific first: a TLS failure is also a connect failure, and a DNS
/// failure is reported through the connector as well, so the checks must
/// run in this order.
pub(crate) fn classify(path: &str, err: &reqwest::Error) -> Error {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else if is_tls_failure(err) {
        ErrorKind::Ssl
    } else if is_dns_failure(err) {
        ErrorKind::Dns
    } else if err.is_connect() || is_connection_io(err) {
        ErrorKind::Connection
    } else {
        ErrorKind::Unknown
    };
    let message = describe(err);
    debug!(%kind, path, error = %message, "request failed");
    Error::new(kind, path, message)
}

/// Every error reachable from `err`. Custom `io::Error`s are opened with
/// `get_ref()` at each level, since their `source()` skips the wrapped
/// error itself and `hyper`/`rustls` nest them more than once.
fn chain<'a>(err: &'a (dyn StdError + 'static)) -> Vec<&'a (dyn StdError + 'static)> {
    let mut out = Vec::new();
    let mut pending = vec![err];
    while let Some(e) = pending.pop() {
        out.push(e);
        if let Some(source) = e.source() {
            pending.push(source);
        }
        if let Some(inner) = e.downcast_ref::<io::Error>().and_then(io::Error::get_ref) {
            pending.push(inner);
        }
    }
    out
}

fn is_tls_failure(err: &(dyn StdError + 'static)) -> bool {
    chain(err).into_iter().any(|e| {
        if e.downcast_ref::<rustls::Error>().is_some() {
            return true;
        }
        let text = e.to_string().to_ascii_lowercase();
        [
            "certificate",
            "tls handshake",
            "handshake failure",
            "received corrupt message",
        ]
            .iter()
            .any(|needle| text.contains(needle))
            || text.starts_with("tls ")
            || text.contains(" tls ")
    })
}

fn is_dns_failure(err: &reqwest::Error) -> bool {
    chain(err).into_iter().any(|e| {
        let text = e.to_string().to_ascii_lowercase();
        text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
            || text.contains("nodename nor servname")
    })
}

fn is_connection_io(err: &reqwest::Error) -> bool {
    chain(err).into_iter().any(|e| {
        e.downcast_ref::<io::Error>().is_some_and(|io_err| {
            matches!(
                io_err.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            )
        })
    })
}

/// Flatten the error chain into one line; `reqwest`'s own `Display` stops
/// at the outermost layer and hides the useful part.
fn describe(err: &reqwest::Error) -> String {
    let mut parts: Vec<String> = Vec::new();
    for e in chain(err) {
        let text = e.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
    }
    parts.join(": ")
}
