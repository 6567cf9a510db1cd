// ── Host entity sink ──
//
// The host side of entity management: registrations and state writes flow
// out of the core through `SensorSink`. `EntityRegistry` is an in-memory
// sink with concurrent lookups and change notification, used by the CLI
// and by tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::entity::{EntityRegistration, SensorState};
use crate::error::UpdateFailed;

/// Receives entity registrations and state writes.
pub trait SensorSink: Send + Sync {
    /// Register new entities. Entities already known to the sink are
    /// ignored.
    fn add_entities(&self, entities: Vec<EntityRegistration>);

    /// Publish the current state of some entities.
    fn write_states(&self, states: &[SensorState]);

    /// A refresh cycle failed. States marked unavailable follow.
    fn update_failed(&self, err: &UpdateFailed) {
        debug!(error = %err, "update failed");
    }

    /// Drop entities, e.g. on unload.
    fn remove_entities(&self, entity_ids: &[String]);
}

/// One entity as stored in an [`EntityRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredEntity {
    pub registration: EntityRegistration,
    /// `None` until the first state write.
    pub state: Option<SensorState>,
}

/// In-memory [`SensorSink`].
///
/// Keyed by entity id. Every mutation bumps a version counter that
/// subscribers can watch.
#[derive(Debug)]
pub struct EntityRegistry {
    entities: DashMap<String, RegisteredEntity>,
    version: watch::Sender<u64>,
    failures: AtomicU64,
    last_failure: Mutex<Option<UpdateFailed>>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            entities: DashMap::new(),
            version,
            failures: AtomicU64::new(0),
            last_failure: Mutex::new(None),
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<RegisteredEntity> {
        self.entities.get(entity_id).map(|r| r.value().clone())
    }

    /// Last written state of `entity_id`.
    pub fn state(&self, entity_id: &str) -> Option<SensorState> {
        self.entities.get(entity_id).and_then(|r| r.state.clone())
    }

    /// All entity ids, sorted.
    pub fn entity_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entities.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Every entity with its last state, sorted by entity id.
    pub fn entities(&self) -> Vec<RegisteredEntity> {
        let mut all: Vec<RegisteredEntity> = self.entities.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.registration.entity_id.cmp(&b.registration.entity_id));
        all
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of failed refresh cycles reported so far.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }

    pub fn last_failure(&self) -> Option<UpdateFailed> {
        self.last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Observe mutations. The value is a monotonically increasing version.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

impl SensorSink for EntityRegistry {
    fn add_entities(&self, entities: Vec<EntityRegistration>) {
        let mut added = 0usize;
        for registration in entities {
            let entity_id = registration.entity_id.clone();
            if self.entities.contains_key(&entity_id) {
                warn!(%entity_id, "entity already registered, ignoring");
                continue;
            }
            self.entities.insert(
                entity_id,
                RegisteredEntity {
                    registration,
                    state: None,
                },
            );
            added += 1;
        }
        if added > 0 {
            debug!(added, "entities registered");
            self.bump_version();
        }
    }

    fn write_states(&self, states: &[SensorState]) {
        let mut written = 0usize;
        for state in states {
            match self.entities.get_mut(&state.entity_id) {
                Some(mut entity) => {
                    entity.state = Some(state.clone());
                    written += 1;
                }
                None => debug!(entity_id = %state.entity_id, "state for unknown entity dropped"),
            }
        }
        if written > 0 {
            self.bump_version();
        }
    }

    fn update_failed(&self, err: &UpdateFailed) {
        self.failures.fetch_add(1, Ordering::AcqRel);
        *self.last_failure.lock().unwrap_or_else(PoisonError::into_inner) = Some(err.clone());
        self.bump_version();
    }

    fn remove_entities(&self, entity_ids: &[String]) {
        let removed = entity_ids
            .iter()
            .filter(|id| self.entities.remove(id.as_str()).is_some())
            .count();
        if removed > 0 {
            debug!(removed, "entities removed");
            self.bump_version();
        }
    }
}
