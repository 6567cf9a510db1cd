use std::fmt;

use thiserror::Error;

/// Top-level error type for the `gatus-api` crate.
///
/// Every request failure lands in exactly one of these variants. Raw
/// `reqwest` errors never escape the client; they are classified first
/// (see [`crate::client`]) and carried here as a message together with the
/// API path that was being fetched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The request exceeded the per-request deadline.
    #[error("Timeout error getting from {path}: {message}")]
    Timeout { path: String, message: String },

    /// Certificate validation or the TLS handshake failed.
    #[error("SSL error getting from {path}: {message}")]
    Ssl { path: String, message: String },

    /// The server hostname could not be resolved.
    #[error("DNS error getting from {path}: {message}")]
    Dns { path: String, message: String },

    /// Any other network-level connection failure (refused, reset, ...).
    #[error("Connection error getting from {path}: {message}")]
    Connection { path: String, message: String },

    // ── Everything else ─────────────────────────────────────────────
    /// Non-2xx status, malformed JSON, or an unexpected failure.
    #[error("Error getting from {path}: {message}")]
    Unknown { path: String, message: String },
}

/// The closed set of failure classes, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    Ssl,
    Dns,
    Connection,
    Unknown,
}

impl ErrorKind {
    /// Short lowercase identifier (`"timeout"`, `"ssl"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Ssl => "ssl",
            Self::Dns => "dns",
            Self::Connection => "connection",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        let message = message.into();
        match kind {
            ErrorKind::Timeout => Self::Timeout { path, message },
            ErrorKind::Ssl => Self::Ssl { path, message },
            ErrorKind::Dns => Self::Dns { path, message },
            ErrorKind::Connection => Self::Connection { path, message },
            ErrorKind::Unknown => Self::Unknown { path, message },
        }
    }

    /// Which failure class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Ssl { .. } => ErrorKind::Ssl,
            Self::Dns { .. } => ErrorKind::Dns,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The API path the failed request targeted.
    pub fn path(&self) -> &str {
        match self {
            Self::Timeout { path, .. }
            | Self::Ssl { path, .. }
            | Self::Dns { path, .. }
            | Self::Connection { path, .. }
            | Self::Unknown { path, .. } => path,
        }
    }
}
