//! CLI error types with miette diagnostics.
//!
//! Maps core, config and API errors into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use gatus_config::ConfigError;
use gatus_core::{CoreError, ErrorKind, FlowError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const TLS: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to Gatus at {url}")]
    #[diagnostic(
        code(gatus::connection_failed),
        help("Check that Gatus is running and reachable from this host.")
    )]
    ConnectionFailed { url: String, message: String },

    #[error("Could not resolve the Gatus host in {url}")]
    #[diagnostic(
        code(gatus::dns),
        help("Check the hostname in the entry URL: {message}")
    )]
    Dns { url: String, message: String },

    #[error("TLS handshake with {url} failed")]
    #[diagnostic(
        code(gatus::tls_error),
        help(
            "The server certificate could not be verified.\n\
             Re-add the entry with --no-verify-ssl (-k) to accept it.\n\
             Details: {message}"
        )
    )]
    TlsError { url: String, message: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(gatus::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { url: String },

    #[error("Gatus at {url} returned an error: {message}")]
    #[diagnostic(code(gatus::api_error))]
    ApiError { url: String, message: String },

    // ── Entries ──────────────────────────────────────────────────────
    #[error("An entry named '{unique_id}' is already configured")]
    #[diagnostic(
        code(gatus::already_configured),
        help("Pick another name, or remove the old one with: gatus-ha remove {unique_id}")
    )]
    AlreadyConfigured { unique_id: String },

    #[error("Entry '{name}' not found in configuration")]
    #[diagnostic(
        code(gatus::entry_not_found),
        help("Run: gatus-ha entries to see configured entries")
    )]
    EntryNotFound { name: String },

    #[error("No Gatus entries configured")]
    #[diagnostic(
        code(gatus::no_config),
        help(
            "Add one with: gatus-ha add <NAME> <URL>\n\
             Config file: {path}"
        )
    )]
    NoConfig { path: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(gatus::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(gatus::config))]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(gatus::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Dns { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::TlsError { .. } => exit_code::TLS,
            Self::Validation { .. } | Self::EntryNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Build the error for a failure of `kind` against `url`.
    pub fn from_kind(kind: ErrorKind, url: &str, message: String) -> Self {
        let url = url.to_string();
        match kind {
            ErrorKind::Timeout => Self::Timeout { url },
            ErrorKind::Ssl => Self::TlsError { url, message },
            ErrorKind::Dns => Self::Dns { url, message },
            ErrorKind::Connection => Self::ConnectionFailed { url, message },
            ErrorKind::Unknown => Self::ApiError { url, message },
        }
    }

    /// Build the error for a config flow form error.
    pub fn from_flow(err: FlowError, url: &str) -> Self {
        let message = format!("config flow reported '{err}'");
        match err {
            FlowError::InvalidUrl => Self::Validation {
                field: "url".into(),
                reason: format!("not an http(s) URL: {url}"),
            },
            FlowError::Timeout => Self::from_kind(ErrorKind::Timeout, url, message),
            FlowError::Ssl => Self::from_kind(ErrorKind::Ssl, url, message),
            FlowError::Dns => Self::from_kind(ErrorKind::Dns, url, message),
            FlowError::Connection => Self::from_kind(ErrorKind::Connection, url, message),
            FlowError::Unknown => Self::from_kind(ErrorKind::Unknown, url, message),
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownEntry { name } => Self::EntryNotFound { name },
            ConfigError::NoEntries => Self::NoConfig {
                path: gatus_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::DuplicateEntry { id } => Self::AlreadyConfigured { unique_id: id },
            other => Self::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotReady { title, source } => {
                Self::from_kind(source.kind, &title, source.message)
            }
            CoreError::Api(e) => {
                let path = e.path().to_string();
                Self::from_kind(e.kind(), &path, e.to_string())
            }
        }
    }
}

impl From<gatus_api::Error> for CliError {
    fn from(err: gatus_api::Error) -> Self {
        CoreError::Api(err).into()
    }
}
