// ── Console facade ──
//
// One session against one bridge: the working configuration, the device
// client, background pollers, and the hand-off to a `Reconnector` whenever
// an operation restarts the device.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use bridgectl_api::{BridgeClient, RebootOutcome, SbusMode, TransportConfig};

use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::model::{CrashRecord, RouterMode, SbusSnapshot, StatusSnapshot};
use crate::poller::Poller;
use crate::reconnect::{RebootReason, ReconnectConfig, Reconnector};
use crate::resolver;
use crate::settings::TrackedField;
use crate::state::ConfigState;

/// Highest SBUS source id the router accepts.
const MAX_SBUS_SOURCE: u8 = 2;

/// Result of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub outcome: RebootOutcome,
    /// Fields that differed from the device's copy.
    pub changed: Vec<TrackedField>,
    /// New `.local` address when the save renamed the device.
    pub alternate: Option<Url>,
}

// ── Console ──────────────────────────────────────────────────────────

/// Session handle. Cheaply cloneable via `Arc<ConsoleInner>`.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    client: BridgeClient,
    state: Mutex<ConfigState>,
    cancel: CancellationToken,
    status_poller: Mutex<Poller<StatusSnapshot>>,
    sbus_poller: Mutex<Poller<SbusSnapshot>>,
    crash_poller: Mutex<Poller<Vec<CrashRecord>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Console {
    /// Build a console and its HTTP client. Does NOT contact the device;
    /// call [`connect()`](Self::connect) to load the configuration.
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let client = BridgeClient::new(config.url.clone(), &transport)?;
        Ok(Self::with_client(config, client))
    }

    /// Build a console around an existing client.
    pub fn with_client(config: ConsoleConfig, client: BridgeClient) -> Self {
        Self {
            inner: Arc::new(ConsoleInner {
                config,
                client,
                state: Mutex::new(ConfigState::default()),
                cancel: CancellationToken::new(),
                status_poller: Mutex::new(Poller::new("status")),
                sbus_poller: Mutex::new(Poller::new("sbus")),
                crash_poller: Mutex::new(Poller::new("crashlog")),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &BridgeClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Load the configuration, then push the local clock to the device in
    /// the background.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.reload().await?;

        if self.inner.config.sync_time {
            let client = self.inner.client.clone();
            let cancel = self.inner.cancel.child_token();
            let handle = tokio::spawn(async move {
                let epoch = chrono::Utc::now().timestamp();
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    result = client.sync_time(epoch) => {
                        if let Err(e) = result {
                            debug!(error = %e, "time sync failed (non-fatal)");
                        }
                    }
                }
            });
            self.inner.task_handles.lock().await.push(handle);
        }
        Ok(())
    }

    /// Re-read `/api/config`, discarding unsaved edits.
    pub async fn reload(&self) -> Result<(), CoreError> {
        let payload = self.inner.client.get_config().await?;
        self.inner.state.lock().await.load_from_device(&payload);
        Ok(())
    }

    /// Stop every poller and background task.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.status_poller.lock().await.stop();
        self.inner.sbus_poller.lock().await.stop();
        self.inner.crash_poller.lock().await.stop();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("console shut down");
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Copy of the current configuration state.
    pub async fn state(&self) -> ConfigState {
        self.inner.state.lock().await.clone()
    }

    /// Apply a batch of edits. See [`ConfigState::set_fields`].
    pub async fn set_fields(
        &self,
        edits: &[(TrackedField, String)],
    ) -> Result<Vec<TrackedField>, CoreError> {
        let mut state = self.inner.state.lock().await;
        if !state.is_loaded() {
            return Err(CoreError::NotLoaded);
        }
        state.set_fields(edits)
    }

    /// Drop unsaved edits.
    pub async fn discard_edits(&self) {
        self.inner.state.lock().await.reset();
    }

    /// Validate and submit the configuration.
    ///
    /// On `Accepted` and `Rebooting` the device is going down: hand the
    /// report to [`reconnector()`](Self::reconnector). The submitted values
    /// become the confirmed snapshot in every non-error case; on error the
    /// state is left as it was. The state lock is not held during the
    /// request.
    pub async fn save(&self) -> Result<SaveReport, CoreError> {
        let (original, submitted, request) = {
            let state = self.inner.state.lock().await;
            let original = state.original().cloned().ok_or(CoreError::NotLoaded)?;
            state.validate()?;
            (original, state.current().clone(), state.build_wire_request())
        };

        let changed = submitted.diff(&original);
        debug!(changed = changed.len(), "submitting configuration");

        let outcome = self.inner.client.save_config(&request).await?;

        let alternate = hostname_alternate(
            &self.inner.config.url,
            &original.mdns_hostname,
            &submitted.mdns_hostname,
        );
        self.inner.state.lock().await.confirm(submitted);
        match &outcome {
            RebootOutcome::Unchanged { message } => info!(%message, "device reports no changes"),
            RebootOutcome::Accepted { .. } | RebootOutcome::Rebooting => {
                info!("configuration saved, device restarting");
            }
        }
        Ok(SaveReport {
            outcome,
            changed,
            alternate,
        })
    }

    /// Reconnector for a restart caused by `reason`. `alternate` wins over
    /// the configured alternate address.
    pub fn reconnector(
        &self,
        reason: RebootReason,
        alternate: Option<Url>,
    ) -> Reconnector<BridgeClient> {
        info!(%reason, "handing off to reconnector");
        self.reconnector_with(self.inner.config.reconnect_config(reason), alternate)
    }

    /// Reconnector with explicit timing, for waiting on a restart this
    /// session did not trigger.
    pub fn reconnector_with(
        &self,
        timing: ReconnectConfig,
        alternate: Option<Url>,
    ) -> Reconnector<BridgeClient> {
        let config = &self.inner.config;
        Reconnector::new(
            self.inner.client.clone(),
            config.url.clone(),
            alternate.or_else(|| config.alternate.clone()),
            timing,
            self.inner.cancel.child_token(),
        )
    }

    // ── Maintenance ──────────────────────────────────────────────────

    /// Restore factory settings. The device restarts.
    pub async fn factory_reset(&self) -> Result<RebootOutcome, CoreError> {
        Ok(self.inner.client.factory_reset().await?)
    }

    /// Flash a firmware image. The device restarts.
    pub async fn upload_firmware(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<RebootOutcome, CoreError> {
        if image.is_empty() {
            return Err(CoreError::InvalidValue {
                field: "firmware".into(),
                reason: "image is empty".into(),
            });
        }
        Ok(self.inner.client.upload_firmware(image, filename).await?)
    }

    /// Full configuration backup.
    pub async fn export_config(&self) -> Result<Value, CoreError> {
        Ok(self.inner.client.export_config().await?)
    }

    /// Restore a backup produced by [`export_config()`](Self::export_config).
    /// The device restarts.
    pub async fn import_config(
        &self,
        contents: Vec<u8>,
        filename: &str,
    ) -> Result<RebootOutcome, CoreError> {
        match serde_json::from_slice::<Value>(&contents) {
            Ok(Value::Object(_)) => {}
            Ok(_) => {
                return Err(CoreError::InvalidValue {
                    field: "config".into(),
                    reason: "backup must be a JSON object".into(),
                });
            }
            Err(e) => {
                return Err(CoreError::InvalidValue {
                    field: "config".into(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(self.inner.client.import_config(contents, filename).await?)
    }

    /// Push `epoch_secs` (or the local clock) to the device.
    pub async fn sync_time(&self, epoch_secs: Option<i64>) -> Result<i64, CoreError> {
        let epoch = epoch_secs.unwrap_or_else(|| chrono::Utc::now().timestamp());
        self.inner.client.sync_time(epoch).await?;
        Ok(epoch)
    }

    /// Clear traffic counters. Returns the device's message.
    pub async fn reset_stats(&self) -> Result<String, CoreError> {
        let ack = self.inner.client.reset_stats().await?;
        Ok(ack.message.unwrap_or_else(|| "Statistics reset".into()))
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub async fn status(&self) -> Result<StatusSnapshot, CoreError> {
        Ok(self.inner.client.get_status().await?.into())
    }

    pub async fn logs(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.inner.client.get_logs().await?)
    }

    /// Crash entries as the device lists them.
    pub async fn crash_log(&self) -> Result<Vec<CrashRecord>, CoreError> {
        let log = self.inner.client.get_crash_log().await?;
        Ok(log.entries.into_iter().map(Into::into).collect())
    }

    pub async fn clear_crash_log(&self) -> Result<(), CoreError> {
        Ok(self.inner.client.clear_crash_log().await?)
    }

    // ── SBUS router ──────────────────────────────────────────────────

    pub async fn sbus_status(&self) -> Result<SbusSnapshot, CoreError> {
        Ok(self.inner.client.sbus_status().await?.into())
    }

    /// Select the router source (`0..=2`).
    pub async fn set_sbus_source(&self, source: u8) -> Result<(), CoreError> {
        if source > MAX_SBUS_SOURCE {
            return Err(CoreError::InvalidValue {
                field: "source".into(),
                reason: format!("must be 0-{MAX_SBUS_SOURCE}, got {source}"),
            });
        }
        Ok(self.inner.client.set_sbus_source(source).await?)
    }

    pub async fn set_sbus_mode(&self, mode: RouterMode) -> Result<(), CoreError> {
        let mode = match mode {
            RouterMode::Auto => SbusMode::Auto,
            RouterMode::Manual => SbusMode::Manual,
        };
        Ok(self.inner.client.set_sbus_mode(mode).await?)
    }

    // ── Pollers ──────────────────────────────────────────────────────

    /// Start polling `/api/status`. A second call while running only hands
    /// out another receiver.
    pub async fn start_status_poller(&self) -> watch::Receiver<Option<Arc<StatusSnapshot>>> {
        let mut poller = self.inner.status_poller.lock().await;
        let client = self.inner.client.clone();
        poller.start(&self.inner.cancel, self.inner.config.poll_interval, move || {
            let client = client.clone();
            async move {
                let status = client.get_status().await?;
                Ok::<_, CoreError>(StatusSnapshot::from(status))
            }
        });
        poller.subscribe()
    }

    pub async fn stop_status_poller(&self) {
        self.inner.status_poller.lock().await.stop();
    }

    /// Run the SBUS poller exactly when the current roles use SBUS.
    /// Returns whether it is running afterwards.
    pub async fn sync_sbus_poller(&self) -> bool {
        let active = resolver::is_sbus_active(&self.inner.state.lock().await.roles());
        let mut poller = self.inner.sbus_poller.lock().await;
        if active {
            let client = self.inner.client.clone();
            poller.start(&self.inner.cancel, self.inner.config.poll_interval, move || {
                let client = client.clone();
                async move {
                    let sbus = client.sbus_status().await?;
                    Ok::<_, CoreError>(SbusSnapshot::from(sbus))
                }
            });
        } else {
            poller.stop();
        }
        poller.is_running()
    }

    pub async fn sbus_updates(&self) -> watch::Receiver<Option<Arc<SbusSnapshot>>> {
        self.inner.sbus_poller.lock().await.subscribe()
    }

    pub async fn start_crash_poller(&self) -> watch::Receiver<Option<Arc<Vec<CrashRecord>>>> {
        let mut poller = self.inner.crash_poller.lock().await;
        let client = self.inner.client.clone();
        poller.start(&self.inner.cancel, self.inner.config.poll_interval, move || {
            let client = client.clone();
            async move {
                let log = client.get_crash_log().await?;
                Ok::<_, CoreError>(log.entries.into_iter().map(CrashRecord::from).collect())
            }
        });
        poller.subscribe()
    }

    pub async fn stop_crash_poller(&self) {
        self.inner.crash_poller.lock().await.stop();
    }
}

/// `origin` with the host swapped for `{new}.local`, when the hostname
/// changed and the device was reached through mDNS.
fn hostname_alternate(origin: &Url, old: &str, new: &str) -> Option<Url> {
    let new = new.trim();
    if new.is_empty() || new.eq_ignore_ascii_case(old.trim()) {
        return None;
    }
    if !origin.host_str().is_some_and(|h| h.ends_with(".local")) {
        return None;
    }
    let mut url = origin.clone();
    if let Err(e) = url.set_host(Some(&format!("{new}.local"))) {
        warn!(error = %e, hostname = new, "new hostname is not a valid host");
        return None;
    }
    url.set_path("/");
    Some(url)
}
