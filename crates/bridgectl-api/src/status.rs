// Runtime status endpoints
//
// Status snapshot, statistics reset, clock sync, and the reachability
// probes used while waiting for a restarted device.

use tracing::debug;
use url::Url;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{Ack, DeviceStatus};

impl BridgeClient {
    /// Get the runtime status snapshot.
    ///
    /// `GET /api/status`
    pub async fn get_status(&self) -> Result<DeviceStatus, Error> {
        let url = self.url("api/status")?;
        debug!("fetching status");
        self.get(url).await
    }

    /// Clear traffic counters and the log buffer.
    ///
    /// `GET /reset_stats`
    pub async fn reset_stats(&self) -> Result<Ack, Error> {
        let url = self.url("reset_stats")?;
        debug!("resetting statistics");
        self.get_ack(url).await
    }

    /// Push the local wall clock to the device so crash entries get timestamps.
    ///
    /// `GET /api/time?epoch={secs}`
    pub async fn sync_time(&self, epoch_secs: i64) -> Result<(), Error> {
        let url = self.url(&format!("api/time?epoch={epoch_secs}"))?;
        debug!(epoch_secs, "syncing device clock");

        let resp = self.http().get(url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::Http {
                status: resp.status().as_u16(),
                message: "time sync failed".into(),
            });
        }
        Ok(())
    }

    // ── Reachability probes ──────────────────────────────────────────

    /// Succeeds on any HTTP answer from `target`, whatever the status.
    ///
    /// Used for alternate addresses, where a captive page or redirect is
    /// still proof the device is up.
    pub async fn probe_any(&self, target: &Url) -> Result<(), Error> {
        debug!("probing {}", target);
        self.http().get(target.clone()).send().await?;
        Ok(())
    }

    /// Succeeds only when `{target}/api/status` answers 2xx.
    pub async fn probe_status(&self, target: &Url) -> Result<(), Error> {
        let url = target.join("api/status")?;
        debug!("probing {}", url);

        let resp = self.http().get(url).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Error::Http {
                status: resp.status().as_u16(),
                message: "Not ready".into(),
            })
        }
    }
}
