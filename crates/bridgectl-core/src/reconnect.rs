// ── Post-reboot reconnection ──
//
// After a save, reset, import or firmware upload the device restarts and may
// come back under a different address. A `Reconnector` counts down, races
// reachability probes against every candidate address, and retries for a
// fixed number of rounds before handing the candidate list back to the user.
//
// One instance per reboot-inducing action. State is published through a
// `watch` channel so a spinner can follow along.

use std::future::Future;
use std::time::Duration;

use futures_util::future::select_ok;
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use bridgectl_api::BridgeClient;

use crate::error::CoreError;

/// Address the firmware's access point always answers on.
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1/";

// ── Probing ──────────────────────────────────────────────────────────

/// What counts as "reachable" for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    /// Any HTTP answer.
    Lenient,
    /// `GET /api/status` must answer 2xx.
    Strict,
}

/// One reachability check against a candidate address.
pub trait Probe: Send + Sync {
    fn probe(&self, target: &Url, mode: ProbeMode)
    -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl Probe for BridgeClient {
    async fn probe(&self, target: &Url, mode: ProbeMode) -> Result<(), CoreError> {
        match mode {
            ProbeMode::Lenient => self.probe_any(target).await?,
            ProbeMode::Strict => self.probe_status(target).await?,
        }
        Ok(())
    }
}

// ── Configuration ────────────────────────────────────────────────────

/// Action that restarted the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RebootReason {
    #[strum(serialize = "save")]
    Save,
    #[strum(serialize = "factory reset")]
    FactoryReset,
    #[strum(serialize = "firmware update")]
    Firmware,
    #[strum(serialize = "config import")]
    Import,
}

impl RebootReason {
    /// Countdown before the first probe. Flashing takes longer than a
    /// settings restart.
    pub fn default_wait(self) -> Duration {
        match self {
            Self::Firmware => Duration::from_secs(12),
            Self::Save | Self::FactoryReset | Self::Import => Duration::from_secs(8),
        }
    }
}

/// Timing for one reconnect run.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Countdown before each probe round, in whole seconds. Default: 8s.
    pub wait: Duration,

    /// Probe rounds before giving up. Default: 3.
    pub max_rounds: u32,

    /// Upper bound on one probe round. Default: 5s.
    pub probe_timeout: Duration,

    /// Pause between the winning probe and reporting it. Default: 500ms.
    pub confirm_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_secs(8),
            max_rounds: 3,
            probe_timeout: Duration::from_secs(5),
            confirm_delay: Duration::from_millis(500),
        }
    }
}

impl ReconnectConfig {
    /// Defaults with the countdown for `reason`.
    pub fn for_reason(reason: RebootReason) -> Self {
        Self {
            wait: reason.default_wait(),
            ..Self::default()
        }
    }
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Counting,
    Probing,
    Succeeded(Url),
    Exhausted,
    Cancelled,
}

/// Snapshot of a reconnect run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectState {
    /// 1-based.
    pub round: u32,
    pub max_rounds: u32,
    pub countdown_remaining: u64,
    pub candidates: Vec<Url>,
    pub phase: Phase,
}

impl ReconnectState {
    /// `Rebooting` for the first round, `Retrying` afterwards.
    pub fn label(&self) -> &'static str {
        if self.round >= 2 { "Retrying" } else { "Rebooting" }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.phase,
            Phase::Succeeded(_) | Phase::Exhausted | Phase::Cancelled
        )
    }
}

// ── Reconnector ──────────────────────────────────────────────────────

/// Countdown / probe / retry state machine for one restart.
pub struct Reconnector<P> {
    probe: P,
    origin: Url,
    alternate: Option<Url>,
    config: ReconnectConfig,
    state_tx: watch::Sender<ReconnectState>,
    cancel: CancellationToken,
}

impl<P: Probe> Reconnector<P> {
    /// `origin` is the address the device was reached on; `alternate` is
    /// where it is expected to reappear (a new hostname, for instance).
    pub fn new(
        probe: P,
        origin: Url,
        alternate: Option<Url>,
        config: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Self {
        let config = ReconnectConfig {
            max_rounds: config.max_rounds.max(1),
            ..config
        };
        let candidates = candidate_urls(&origin, alternate.as_ref());
        let (state_tx, _) = watch::channel(ReconnectState {
            round: 1,
            max_rounds: config.max_rounds,
            countdown_remaining: config.wait.as_secs(),
            candidates,
            phase: Phase::Counting,
        });
        Self {
            probe,
            origin,
            alternate,
            config,
            state_tx,
            cancel,
        }
    }

    /// Receiver for state updates.
    pub fn subscribe(&self) -> watch::Receiver<ReconnectState> {
        self.state_tx.subscribe()
    }

    /// Everything the user can try by hand: alternate, origin, default AP.
    pub fn candidates(&self) -> Vec<Url> {
        candidate_urls(&self.origin, self.alternate.as_ref())
    }

    /// Targets probed each round. A `.local` origin is skipped when an
    /// alternate exists: mDNS keeps answering for the old name for a while.
    fn probe_targets(&self) -> Vec<(Url, ProbeMode)> {
        let mut targets = Vec::with_capacity(2);
        if let Some(alt) = &self.alternate {
            targets.push((alt.clone(), ProbeMode::Lenient));
        }
        let stale_mdns = self.alternate.is_some()
            && self
                .origin
                .host_str()
                .is_some_and(|h| h.ends_with(".local"));
        if !stale_mdns {
            targets.push((self.origin.clone(), ProbeMode::Strict));
        }
        targets
    }

    fn publish(&self, update: impl FnOnce(&mut ReconnectState)) {
        self.state_tx.send_modify(update);
    }

    /// Drive the state machine to completion. Returns the address that
    /// answered, `ReconnectExhausted` after the last round, or `Cancelled`.
    pub async fn run(self) -> Result<Url, CoreError> {
        let targets = self.probe_targets();
        info!(
            targets = targets.len(),
            wait_secs = self.config.wait.as_secs(),
            "waiting for device to restart"
        );

        for round in 1..=self.config.max_rounds {
            self.publish(|s| {
                s.round = round;
                s.countdown_remaining = self.config.wait.as_secs();
                s.phase = Phase::Counting;
            });

            if !self.countdown().await {
                return Err(self.cancelled());
            }

            self.publish(|s| s.phase = Phase::Probing);

            let race = tokio::time::timeout(self.config.probe_timeout, self.race(&targets));
            let winner = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(self.cancelled()),
                result = race => match result {
                    Ok(Ok(url)) => Some(url),
                    Ok(Err(e)) => {
                        debug!(round, error = %e, "no candidate answered");
                        None
                    }
                    Err(_) => {
                        debug!(round, "probe round timed out");
                        None
                    }
                },
            };

            if let Some(url) = winner {
                tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => return Err(self.cancelled()),
                    () = tokio::time::sleep(self.config.confirm_delay) => {}
                }
                info!(%url, round, "device is back");
                self.publish(|s| s.phase = Phase::Succeeded(url.clone()));
                return Ok(url);
            }
        }

        self.publish(|s| s.phase = Phase::Exhausted);
        let candidates = self.candidates();
        Err(CoreError::ReconnectExhausted {
            rounds: self.config.max_rounds,
            candidates: candidates.iter().map(ToString::to_string).collect(),
        })
    }

    /// Tick the countdown down to zero, one second at a time. `false` when
    /// cancelled.
    async fn countdown(&self) -> bool {
        let mut remaining = self.config.wait.as_secs();
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.tick().await; // consume the immediate first tick

        while remaining > 0 {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return false,
                _ = interval.tick() => {
                    remaining -= 1;
                    self.publish(|s| s.countdown_remaining = remaining);
                }
            }
        }
        true
    }

    /// First target to answer. Failed probes drop out of the race; it only
    /// fails once every probe has.
    async fn race(&self, targets: &[(Url, ProbeMode)]) -> Result<Url, CoreError> {
        if targets.is_empty() {
            return Err(CoreError::Internal("no reconnect targets".into()));
        }
        let probes = targets.iter().map(|(url, mode)| {
            Box::pin(async move {
                self.probe.probe(url, *mode).await?;
                Ok::<_, CoreError>(url.clone())
            })
        });
        let (url, _pending) = select_ok(probes).await?;
        Ok(url)
    }

    fn cancelled(&self) -> CoreError {
        debug!("reconnect cancelled");
        self.publish(|s| s.phase = Phase::Cancelled);
        CoreError::Cancelled
    }
}

/// Alternate, origin and the default AP address, without duplicates.
fn candidate_urls(origin: &Url, alternate: Option<&Url>) -> Vec<Url> {
    let mut out: Vec<Url> = Vec::with_capacity(3);
    let fallback = Url::parse(DEFAULT_DEVICE_URL).ok();
    for url in alternate.into_iter().chain([origin]).chain(fallback.as_ref()) {
        if !out.contains(url) {
            out.push(url.clone());
        }
    }
    out
}
