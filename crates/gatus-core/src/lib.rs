//! Host-facing core of the Gatus bridge.
//!
//! Sits between `gatus-api` and whatever home-automation host embeds it:
//!
//! - **[`Coordinator`]**: refreshes a [`StatusSnapshot`] from a
//!   [`StatusSource`] and caches the last good one. Client failures of any
//!   kind collapse into a single [`UpdateFailed`] signal.
//!
//! - **[`Scheduler`]**: fixed-interval callback registration supplied by
//!   the host. [`TokioScheduler`] is the stock implementation.
//!
//! - **[`SensorSink`]**: where entity registrations and state writes go.
//!   [`EntityRegistry`] is an in-memory implementation.
//!
//! - **[`ConfigFlow`]**: validates user input for a new config entry by
//!   probing the server, keeping the specific failure kind for the form.
//!
//! - **[`setup_entry`]**: wires all of the above together for one
//!   [`ConfigEntry`] and returns a [`GatusRuntime`] handle for unload and
//!   reload.

pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod flow;
pub mod scheduler;
pub mod setup;
pub mod sink;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConfigEntry, CoordinatorSettings, DOMAIN, slugify};
pub use coordinator::{Coordinator, StatusSource};
pub use entity::{
    DeviceClass, DeviceEntryType, DeviceInfo, EntityRegistration, GatusBinarySensor,
    SensorAttributes, SensorState,
};
pub use error::{CoreError, UpdateFailed};
pub use flow::{ConfigFlow, FlowError, FlowInput, FlowResult};
pub use scheduler::{IntervalCallback, IntervalHandle, Scheduler, TokioScheduler};
pub use setup::{GatusRuntime, setup_entry, setup_with_source};
pub use sink::{EntityRegistry, RegisteredEntity, SensorSink};

// Re-export the API types consumers see through the coordinator.
pub use gatus_api::{EndpointStatus, ErrorKind, ServerConfig, StatusSnapshot, Transport};
