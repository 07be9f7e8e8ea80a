// ── Periodic pollers ──
//
// Single-flight background fetchers for status, SBUS router state and the
// crash log. Each result is published whole through a `watch` channel.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// A restartable periodic fetch of one resource.
pub struct Poller<T> {
    name: &'static str,
    tx: watch::Sender<Option<Arc<T>>>,
    running: Option<Running>,
}

impl<T: Send + Sync + 'static> Poller<T> {
    pub fn new(name: &'static str) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            name,
            tx,
            running: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.tx.subscribe()
    }

    /// Most recent result, if any poll has succeeded yet.
    pub fn latest(&self) -> Option<Arc<T>> {
        self.tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|r| !r.handle.is_finished())
    }

    /// Spawn the poll loop under a child of `parent`. Fetches immediately,
    /// then every `period`. Returns `false` (and does nothing) when already
    /// running.
    pub fn start<F, Fut>(&mut self, parent: &CancellationToken, period: Duration, fetch: F) -> bool
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        if self.is_running() {
            return false;
        }

        let cancel = parent.child_token();
        let handle = tokio::spawn(poll_task(
            self.name,
            period,
            cancel.clone(),
            self.tx.clone(),
            fetch,
        ));
        debug!(poller = self.name, period_ms = period.as_millis(), "poller started");
        self.running = Some(Running { cancel, handle });
        true
    }

    /// Stop polling. The last published value stays readable.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            debug!(poller = self.name, "poller stopped");
        }
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

async fn poll_task<T, F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    tx: watch::Sender<Option<Arc<T>>>,
    fetch: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = fetch() => result,
        };

        match result {
            // A late answer for a stopped poller is discarded.
            Ok(_) if cancel.is_cancelled() => break,
            Ok(value) => {
                tx.send_replace(Some(Arc::new(value)));
            }
            Err(e) => warn!(poller = name, error = %e, "poll failed"),
        }
    }
}
