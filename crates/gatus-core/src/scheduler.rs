// ── Fixed-interval scheduling ──
//
// The host decides how periodic work is run; the core only asks for "call
// this every N seconds". `TokioScheduler` is the stock implementation: one
// task per registration, ticking on `tokio::time::interval`. Each callback
// is awaited before the next tick is considered, so a registration never
// has two callbacks in flight.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Periodic work registered with a [`Scheduler`].
pub type IntervalCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Fixed-interval callback registration supplied by the host.
pub trait Scheduler: Send + Sync {
    /// Run `callback` every `period`, starting one period from now.
    ///
    /// The registration lives as long as the returned handle.
    fn track_interval(&self, period: Duration, callback: IntervalCallback) -> IntervalHandle;
}

/// Owns one interval registration. Cancelled on drop.
#[derive(Debug)]
pub struct IntervalHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl IntervalHandle {
    /// A handle backed by an arbitrary token, for hosts that run intervals
    /// outside tokio tasks.
    pub fn from_token(cancel: CancellationToken) -> Self {
        Self { cancel, task: None }
    }

    /// Stop ticking. An in-flight callback is abandoned.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel and wait for the interval task to exit.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// [`Scheduler`] backed by tokio tasks.
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    parent: CancellationToken,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tie every registration to `parent`; cancelling it stops them all.
    pub fn with_parent(parent: CancellationToken) -> Self {
        Self { parent }
    }
}

impl Scheduler for TokioScheduler {
    fn track_interval(&self, period: Duration, callback: IntervalCallback) -> IntervalHandle {
        let cancel = self.parent.child_token();
        let task = tokio::spawn(interval_task(period, callback, cancel.clone()));
        IntervalHandle {
            cancel,
            task: Some(task),
        }
    }
}

async fn interval_task(period: Duration, callback: IntervalCallback, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        debug!("interval cancelled with callback in flight");
                        break;
                    }
                    () = callback() => {}
                }
            }
        }
    }
    debug!(?period, "interval task stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use futures_util::FutureExt;

    use super::*;

    fn counting(counter: Arc<AtomicUsize>) -> IntervalCallback {
        Arc::new(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_every_period_after_the_first() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = TokioScheduler::new();
        let _handle = scheduler.track_interval(Duration::from_secs(10), counting(Arc::clone(&counter)));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticking() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = TokioScheduler::new();
        let handle = scheduler.track_interval(Duration::from_secs(10), counting(Arc::clone(&counter)));

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_token_cancels_registrations() {
        let counter = Arc::new(AtomicUsize::new(0));
        let parent = CancellationToken::new();
        let scheduler = TokioScheduler::with_parent(parent.clone());
        let handle = scheduler.track_interval(Duration::from_secs(10), counting(Arc::clone(&counter)));

        parent.cancel();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_callbacks_never_overlap() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));

        let callback: IntervalCallback = {
            let in_flight = Arc::clone(&in_flight);
            let max_seen = Arc::clone(&max_seen);
            let runs = Arc::clone(&runs);
            Arc::new(move || {
                let in_flight = Arc::clone(&in_flight);
                let max_seen = Arc::clone(&max_seen);
                let runs = Arc::clone(&runs);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(25)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    runs.fetch_add(1, Ordering::SeqCst);
                }
                .boxed()
            })
        };

        let _handle = TokioScheduler::new().track_interval(Duration::from_secs(10), callback);
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert!(runs.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_abandons_in_flight_callback() {
        let finished = Arc::new(AtomicBool::new(false));
        let callback: IntervalCallback = {
            let finished = Arc::clone(&finished);
            Arc::new(move || {
                let finished = Arc::clone(&finished);
                async move {
                    tokio::time::sleep(Duration::from_secs(100)).await;
                    finished.store(true, Ordering::SeqCst);
                }
                .boxed()
            })
        };

        let handle = TokioScheduler::new().track_interval(Duration::from_secs(10), callback);
        tokio::time::sleep(Duration::from_secs(15)).await;
        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(200)).await;

        assert!(!finished.load(Ordering::SeqCst));
    }
}
