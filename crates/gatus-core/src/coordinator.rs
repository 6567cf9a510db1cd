// ── Polling coordinator ──
//
// Owns the last good `StatusSnapshot` for one config entry. A refresh is a
// single `fetch_statuses()` call; failures leave the cached snapshot alone
// and surface as `UpdateFailed`. Scheduling lives elsewhere (see
// `scheduler`), so this type never sleeps or retries on its own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gatus_api::{StatusClient, StatusSnapshot};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{CoreError, UpdateFailed};

/// Anything that can produce a fresh snapshot.
///
/// Implemented by [`StatusClient`]; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_statuses(&self) -> Result<StatusSnapshot, gatus_api::Error>;
}

#[async_trait]
impl StatusSource for StatusClient {
    async fn fetch_statuses(&self) -> Result<StatusSnapshot, gatus_api::Error> {
        StatusClient::fetch_statuses(self).await
    }
}

/// Refreshes and caches the status snapshot of one Gatus server.
pub struct Coordinator {
    name: String,
    source: Arc<dyn StatusSource>,
    update_interval: Duration,
    data: watch::Sender<Option<Arc<StatusSnapshot>>>,
    last_update_success: AtomicBool,
    last_error: Mutex<Option<UpdateFailed>>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("name", &self.name)
            .field("update_interval", &self.update_interval)
            .field("last_update_success", &self.last_update_success())
            .finish_non_exhaustive()
    }
}

impl Coordinator {
    pub fn new(name: impl Into<String>, source: Arc<dyn StatusSource>, update_interval: Duration) -> Self {
        let (data, _) = watch::channel(None);
        Self {
            name: name.into(),
            source,
            update_interval,
            data,
            last_update_success: AtomicBool::new(true),
            last_error: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Fetch a new snapshot.
    ///
    /// On success the cached snapshot is replaced and returned. On failure
    /// the previous snapshot is kept and the failure is returned as
    /// [`UpdateFailed`], whatever its original kind.
    pub async fn refresh(&self) -> Result<Arc<StatusSnapshot>, UpdateFailed> {
        debug!(coordinator = %self.name, "refreshing");
        match self.source.fetch_statuses().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.data.send_replace(Some(Arc::clone(&snapshot)));
                self.set_error(None);
                if !self.last_update_success.swap(true, Ordering::AcqRel) {
                    info!(coordinator = %self.name, "fetching gatus data recovered");
                }
                debug!(
                    coordinator = %self.name,
                    endpoints = snapshot.len(),
                    "refresh succeeded"
                );
                Ok(snapshot)
            }
            Err(err) => {
                let failed = UpdateFailed::from(err);
                // Warn once per outage; repeats go to debug.
                if self.last_update_success.swap(false, Ordering::AcqRel) {
                    warn!(
                        coordinator = %self.name,
                        kind = %failed.kind,
                        error = %failed.message,
                        "refresh failed"
                    );
                } else {
                    debug!(coordinator = %self.name, error = %failed.message, "refresh still failing");
                }
                self.set_error(Some(failed.clone()));
                Err(failed)
            }
        }
    }

    /// The initial refresh during setup. A failure here means the entry
    /// cannot be set up yet.
    pub async fn first_refresh(&self) -> Result<Arc<StatusSnapshot>, CoreError> {
        self.refresh().await.map_err(|source| CoreError::NotReady {
            title: self.name.clone(),
            source,
        })
    }

    /// The last successfully fetched snapshot, if any.
    pub fn data(&self) -> Option<Arc<StatusSnapshot>> {
        self.data.borrow().clone()
    }

    /// Receiver that observes every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<StatusSnapshot>>> {
        self.data.subscribe()
    }

    /// Whether the most recent refresh succeeded.
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::Acquire)
    }

    /// The failure of the most recent refresh, cleared on success.
    pub fn last_error(&self) -> Option<UpdateFailed> {
        self.last_error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, err: Option<UpdateFailed>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = err;
    }
}
