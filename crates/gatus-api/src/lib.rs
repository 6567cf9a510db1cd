// gatus-api: Async Rust client for the Gatus status-page API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{CONFIG_PATH, DEFAULT_REQUEST_TIMEOUT, STATUSES_PATH, StatusClient};
pub use error::{Error, ErrorKind};
pub use models::{EndpointStatus, ServerConfig, StatusSnapshot};
pub use transport::{Transport, TransportConfig};
