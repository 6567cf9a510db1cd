// Shared HTTP transport for every Gatus client in the process.
//
// `reqwest` fixes certificate verification when the client is built, but a
// config entry chooses it per server. The transport therefore builds one
// verifying and one non-verifying client up front; each `StatusClient`
// borrows whichever its entry asks for. Both share connection pools across
// all clients created from the same `Transport`.

use std::time::Duration;

use crate::error::{Error, ErrorKind};

const USER_AGENT: &str = concat!("gatus-ha/", env!("CARGO_PKG_VERSION"));

/// Settings used when building the shared `reqwest::Client` pair.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// TCP connect timeout. The whole-request deadline is set per request
    /// by the client, not here.
    pub connect_timeout: Duration,
    /// How long idle pooled connections are kept.
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl TransportConfig {
    fn builder(&self) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.pool_idle_timeout)
            .user_agent(USER_AGENT)
    }

    /// Build the verifying / non-verifying client pair.
    pub fn build(&self) -> Result<Transport, Error> {
        let verified = self
            .builder()
            .build()
            .map_err(|e| build_error(&e))?;
        let insecure = self
            .builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| build_error(&e))?;
        Ok(Transport { verified, insecure })
    }
}

fn build_error(err: &reqwest::Error) -> Error {
    Error::new(
        ErrorKind::Unknown,
        "<transport>",
        format!("failed to build HTTP client: {err}"),
    )
}

/// Process-wide HTTP transport. Cloning is cheap and shares the pools.
#[derive(Debug, Clone)]
pub struct Transport {
    verified: reqwest::Client,
    insecure: reqwest::Client,
}

impl Transport {
    /// Build a transport with default settings.
    pub fn new() -> Result<Self, Error> {
        TransportConfig::default().build()
    }

    /// Wrap an existing client. Both verification modes share it, which is
    /// what tests against plain-HTTP mock servers want.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            verified: client.clone(),
            insecure: client,
        }
    }

    /// The client matching the requested certificate policy.
    pub fn client(&self, verify_ssl: bool) -> &reqwest::Client {
        if verify_ssl {
            &self.verified
        } else {
            &self.insecure
        }
    }
}
