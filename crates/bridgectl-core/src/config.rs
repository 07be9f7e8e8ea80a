// ── Runtime console configuration ──
//
// Describes which device to talk to and how patient to be with it.
// The CLI builds a `ConsoleConfig` from its profile and flags; core never
// reads config files.

use std::time::Duration;

use url::Url;

use crate::reconnect::{RebootReason, ReconnectConfig};

/// Configuration for one device session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Device root, e.g. `http://192.168.4.1`.
    pub url: Url,
    /// Where the device is expected to reappear after a restart, if not at `url`.
    pub alternate: Option<Url>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Countdown after a save, reset or import.
    pub save_wait_secs: u64,
    /// Countdown after a firmware upload.
    pub firmware_wait_secs: u64,
    /// Probe rounds before giving up on a restarted device.
    pub max_rounds: u32,
    /// Bound on one probe round.
    pub probe_timeout: Duration,
    /// Period of the status, SBUS and crash-log pollers.
    pub poll_interval: Duration,
    /// Push the local clock to the device after loading.
    pub sync_time: bool,
}

impl ConsoleConfig {
    /// Defaults for the device at `url`.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            alternate: None,
            timeout: Duration::from_secs(10),
            save_wait_secs: RebootReason::Save.default_wait().as_secs(),
            firmware_wait_secs: RebootReason::Firmware.default_wait().as_secs(),
            max_rounds: 3,
            probe_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(5),
            sync_time: true,
        }
    }

    /// Reconnect timing after `reason`.
    pub fn reconnect_config(&self, reason: RebootReason) -> ReconnectConfig {
        let wait_secs = match reason {
            RebootReason::Firmware => self.firmware_wait_secs,
            RebootReason::Save | RebootReason::FactoryReset | RebootReason::Import => {
                self.save_wait_secs
            }
        };
        ReconnectConfig {
            wait: Duration::from_secs(wait_secs),
            max_rounds: self.max_rounds.max(1),
            probe_timeout: self.probe_timeout,
            ..ReconnectConfig::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reconnect_wait_follows_reason() {
        let mut cfg = ConsoleConfig::new(Url::parse("http://192.168.4.1").unwrap());
        cfg.firmware_wait_secs = 20;

        assert_eq!(
            cfg.reconnect_config(RebootReason::Firmware).wait,
            Duration::from_secs(20)
        );
        assert_eq!(
            cfg.reconnect_config(RebootReason::Import).wait,
            Duration::from_secs(8)
        );
        assert_eq!(
            cfg.reconnect_config(RebootReason::Save).confirm_delay,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn zero_rounds_still_probes_once() {
        let mut cfg = ConsoleConfig::new(Url::parse("http://192.168.4.1").unwrap());
        cfg.max_rounds = 0;
        assert_eq!(cfg.reconnect_config(RebootReason::Save).max_rounds, 1);
    }
}
