// ── User config flow ──
//
// Validates a new entry before it is stored: the URL must parse, the server
// must answer `GET api/v1/config`, and the slug of the display name must
// not already be taken. Probe failures keep their specific kind so the
// form can tell a certificate problem from a typo in the hostname.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::time::Duration;

use gatus_api::{DEFAULT_REQUEST_TIMEOUT, ErrorKind, StatusClient, Transport};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use url::Url;

use crate::config::{ConfigEntry, slugify};

/// Form key used for errors that are not tied to a single field.
pub const BASE_ERROR_KEY: &str = "base";

/// What the user typed into the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowInput {
    pub name: String,
    pub url: String,
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,
}

fn default_verify_ssl() -> bool {
    true
}

impl FlowInput {
    pub fn new(name: impl Into<String>, url: impl Into<String>, verify_ssl: bool) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            verify_ssl,
        }
    }

    pub fn unique_id(&self) -> String {
        slugify(&self.name)
    }

    /// Parse `url`, accepting only http(s) URLs with a host.
    pub fn parsed_url(&self) -> Option<Url> {
        let url = Url::parse(self.url.trim()).ok()?;
        let web = matches!(url.scheme(), "http" | "https");
        (web && url.host_str().is_some()).then_some(url)
    }

    /// Turn accepted input into a config entry. `None` if the URL is not
    /// valid.
    pub fn into_entry(self, entry_id: impl Into<String>) -> Option<ConfigEntry> {
        let url = self.parsed_url()?;
        Some(ConfigEntry::new(entry_id, self.name, url, self.verify_ssl))
    }
}

/// Error keys shown on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowError {
    InvalidUrl,
    Timeout,
    Ssl,
    Dns,
    Connection,
    Unknown,
}

impl FlowError {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::Timeout => "timeout",
            Self::Ssl => "ssl",
            Self::Dns => "dns",
            Self::Connection => "connection",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorKind> for FlowError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Timeout => Self::Timeout,
            ErrorKind::Ssl => Self::Ssl,
            ErrorKind::Dns => Self::Dns,
            ErrorKind::Connection => Self::Connection,
            ErrorKind::Unknown => Self::Unknown,
        }
    }
}

/// Outcome of one flow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowResult {
    /// Show the form, with the previous input as defaults.
    Form {
        errors: BTreeMap<String, FlowError>,
        defaults: Option<FlowInput>,
    },
    Abort {
        reason: String,
    },
    CreateEntry {
        title: String,
        data: FlowInput,
    },
}

impl FlowResult {
    fn form_error(err: FlowError, input: FlowInput) -> Self {
        Self::Form {
            errors: BTreeMap::from([(BASE_ERROR_KEY.to_string(), err)]),
            defaults: Some(input),
        }
    }

    /// The base error of a form result.
    pub fn base_error(&self) -> Option<FlowError> {
        match self {
            Self::Form { errors, .. } => errors.get(BASE_ERROR_KEY).copied(),
            _ => None,
        }
    }
}

/// The "add a Gatus server" flow.
#[derive(Debug, Clone)]
pub struct ConfigFlow {
    transport: Transport,
    configured: HashSet<String>,
    timeout: Duration,
}

impl ConfigFlow {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            configured: HashSet::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Unique ids of entries that already exist.
    #[must_use]
    pub fn with_configured<I, S>(mut self, unique_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configured.extend(unique_ids.into_iter().map(Into::into));
        self
    }

    /// Deadline for the connectivity probe.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Handle the user step. `None` asks for an empty form.
    pub async fn step_user(&self, input: Option<FlowInput>) -> FlowResult {
        let Some(input) = input else {
            return FlowResult::Form {
                errors: BTreeMap::new(),
                defaults: None,
            };
        };

        let Some(url) = input.parsed_url() else {
            debug!(url = %input.url, "rejecting invalid url");
            return FlowResult::form_error(FlowError::InvalidUrl, input);
        };

        let client = StatusClient::new(url, input.verify_ssl, &self.transport).with_timeout(self.timeout);
        if let Err(e) = client.fetch_config().await {
            if e.kind() == ErrorKind::Timeout {
                warn!(error = %e, "probe timed out");
            } else {
                error!(kind = %e.kind(), error = %e, "probe failed");
            }
            return FlowResult::form_error(FlowError::from(e.kind()), input);
        }

        let unique_id = input.unique_id();
        if self.configured.contains(&unique_id) {
            return FlowResult::Abort {
                reason: "already_configured".into(),
            };
        }

        FlowResult::CreateEntry {
            title: input.name.clone(),
            data: input,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_validation() {
        let ok = FlowInput::new("Home", "https://status.example.com", true);
        assert!(ok.parsed_url().is_some());

        for bad in ["not a url", "ftp://status.example.com", "status.example.com", ""] {
            assert!(FlowInput::new("Home", bad, true).parsed_url().is_none(), "{bad}");
        }
    }

    #[test]
    fn every_kind_maps_to_its_key() {
        let cases = [
            (ErrorKind::Timeout, "timeout"),
            (ErrorKind::Ssl, "ssl"),
            (ErrorKind::Dns, "dns"),
            (ErrorKind::Connection, "connection"),
            (ErrorKind::Unknown, "unknown"),
        ];
        for (kind, key) in cases {
            assert_eq!(FlowError::from(kind).as_str(), key);
        }
    }

    #[test]
    fn verify_ssl_defaults_to_true() {
        let input: FlowInput = serde_json::from_str(r#"{"name":"Home","url":"http://x"}"#).unwrap();
        assert!(input.verify_ssl);
    }

    #[test]
    fn into_entry_keeps_title_and_flag() {
        let entry = FlowInput::new("Home Gatus", "http://gatus.lan:8080", false)
            .into_entry("home_gatus")
            .unwrap();
        assert_eq!(entry.entry_id, "home_gatus");
        assert_eq!(entry.title, "Home Gatus");
        assert_eq!(entry.unique_id(), "home_gatus");
        assert!(!entry.verify_ssl);
    }

    #[tokio::test]
    async fn no_input_shows_empty_form() {
        let flow = ConfigFlow::new(Transport::from_client(reqwest::Client::new()));
        let result = flow.step_user(None).await;
        assert_eq!(
            result,
            FlowResult::Form {
                errors: BTreeMap::new(),
                defaults: None,
            }
        );
    }

    #[tokio::test]
    async fn invalid_url_never_probes() {
        let flow = ConfigFlow::new(Transport::from_client(reqwest::Client::new()));
        let result = flow
            .step_user(Some(FlowInput::new("Home", "nope", true)))
            .await;
        assert_eq!(result.base_error(), Some(FlowError::InvalidUrl));
    }
}
