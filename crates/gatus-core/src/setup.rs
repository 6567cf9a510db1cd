// ── Entry lifecycle ──
//
// `setup_entry` turns a `ConfigEntry` into a running integration: a
// coordinator with one good snapshot, one sensor per endpoint registered
// with the sink, and a fixed-interval refresh. The returned `GatusRuntime`
// owns the interval; dropping it stops polling, `unload` also removes the
// entities.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::FutureExt;
use gatus_api::{StatusClient, StatusSnapshot, Transport};
use tracing::{debug, info};

use crate::config::{ConfigEntry, CoordinatorSettings};
use crate::coordinator::{Coordinator, StatusSource};
use crate::entity::{EntityRegistration, GatusBinarySensor, SensorState};
use crate::error::CoreError;
use crate::scheduler::{IntervalCallback, IntervalHandle, Scheduler};
use crate::sink::SensorSink;

/// Set up one entry against a real Gatus server.
pub async fn setup_entry(
    entry: ConfigEntry,
    transport: &Transport,
    scheduler: Arc<dyn Scheduler>,
    sink: Arc<dyn SensorSink>,
    settings: CoordinatorSettings,
) -> Result<GatusRuntime, CoreError> {
    let client = StatusClient::new(entry.url.clone(), entry.verify_ssl, transport)
        .with_timeout(settings.request_timeout);
    setup_with_source(entry, Arc::new(client), scheduler, sink, settings).await
}

/// Set up one entry with an arbitrary status source.
pub async fn setup_with_source(
    entry: ConfigEntry,
    source: Arc<dyn StatusSource>,
    scheduler: Arc<dyn Scheduler>,
    sink: Arc<dyn SensorSink>,
    settings: CoordinatorSettings,
) -> Result<GatusRuntime, CoreError> {
    let entry = Arc::new(entry);
    let coordinator = Coordinator::new(entry.title.clone(), Arc::clone(&source), settings.update_interval);
    let snapshot = coordinator.first_refresh().await?;

    let shared = Arc::new(EntryState {
        entry: Arc::clone(&entry),
        coordinator,
        sink: Arc::clone(&sink),
        sensors: Mutex::new(Vec::new()),
        known: Mutex::new(HashSet::new()),
        cycle: tokio::sync::Mutex::new(()),
    });

    let registrations = shared.track_new(&snapshot);
    debug!(entry = %entry.title, sensors = registrations.len(), "registering sensors");
    sink.add_entities(registrations);
    sink.write_states(&shared.states());

    let tick = Arc::clone(&shared);
    let callback: IntervalCallback = Arc::new(move || {
        let state = Arc::clone(&tick);
        async move { state.update().await }.boxed()
    });
    let interval = scheduler.track_interval(settings.update_interval, callback);

    info!("integration {} has been set up", entry.title);

    Ok(GatusRuntime {
        shared,
        source,
        scheduler,
        settings,
        interval: Some(interval),
    })
}

/// State shared between the runtime handle and the interval callback.
struct EntryState {
    entry: Arc<ConfigEntry>,
    coordinator: Coordinator,
    sink: Arc<dyn SensorSink>,
    sensors: Mutex<Vec<GatusBinarySensor>>,
    known: Mutex<HashSet<String>>,
    /// Held for a whole cycle so ticks and `refresh_now` never overlap.
    cycle: tokio::sync::Mutex<()>,
}

impl EntryState {
    /// Create sensors for keys not seen before and return their
    /// registrations.
    fn track_new(&self, snapshot: &StatusSnapshot) -> Vec<EntityRegistration> {
        let mut known = self.known.lock().unwrap_or_else(PoisonError::into_inner);
        let mut sensors = self.sensors.lock().unwrap_or_else(PoisonError::into_inner);

        let mut added = Vec::new();
        for status in snapshot {
            if known.insert(status.key.clone()) {
                let sensor = GatusBinarySensor::new(Arc::clone(&self.entry), status);
                added.push(sensor.registration());
                sensors.push(sensor);
            }
        }
        added
    }

    fn states(&self) -> Vec<SensorState> {
        self.sensors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|s| s.state(&self.coordinator))
            .collect()
    }

    fn entity_ids(&self) -> Vec<String> {
        self.sensors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|s| s.entity_id().to_string())
            .collect()
    }

    /// One refresh cycle: refresh, register new sensors, publish states.
    async fn update(&self) {
        let _cycle = self.cycle.lock().await;
        match self.coordinator.refresh().await {
            Ok(snapshot) => {
                let added = self.track_new(&snapshot);
                if !added.is_empty() {
                    info!(entry = %self.entry.title, count = added.len(), "new endpoints discovered");
                    self.sink.add_entities(added);
                }
            }
            Err(failed) => self.sink.update_failed(&failed),
        }
        self.sink.write_states(&self.states());
    }
}

/// A set-up entry. Polls until dropped or unloaded.
pub struct GatusRuntime {
    shared: Arc<EntryState>,
    source: Arc<dyn StatusSource>,
    scheduler: Arc<dyn Scheduler>,
    settings: CoordinatorSettings,
    interval: Option<IntervalHandle>,
}

impl std::fmt::Debug for GatusRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatusRuntime")
            .field("entry", &self.shared.entry)
            .field("coordinator", &self.shared.coordinator)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl GatusRuntime {
    pub fn entry(&self) -> &ConfigEntry {
        &self.shared.entry
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.shared.coordinator
    }

    pub fn settings(&self) -> CoordinatorSettings {
        self.settings
    }

    /// Sensors created so far, in discovery order.
    pub fn sensors(&self) -> Vec<GatusBinarySensor> {
        self.shared
            .sensors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current state of every sensor.
    pub fn states(&self) -> Vec<SensorState> {
        self.shared.states()
    }

    /// Run one refresh cycle now, outside the interval. Waits for a cycle
    /// already in flight to finish first.
    pub async fn refresh_now(&self) {
        self.shared.update().await;
    }

    /// Stop polling and remove this entry's entities from the sink.
    pub async fn unload(mut self) {
        if let Some(interval) = self.interval.take() {
            interval.shutdown().await;
        }
        let ids = self.shared.entity_ids();
        self.shared.sink.remove_entities(&ids);
        info!(entry = %self.shared.entry.title, removed = ids.len(), "integration unloaded");
    }

    /// Unload and set up again with the same entry and settings.
    pub async fn reload(self) -> Result<Self, CoreError> {
        let entry = (*self.shared.entry).clone();
        let source = Arc::clone(&self.source);
        let scheduler = Arc::clone(&self.scheduler);
        let sink = Arc::clone(&self.shared.sink);
        let settings = self.settings;

        self.unload().await;
        setup_with_source(entry, source, scheduler, sink, settings).await
    }
}
