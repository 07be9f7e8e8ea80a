// SBUS router endpoints

use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{Ack, SbusStatus};

/// Router selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbusMode {
    /// Pick the best source by quality and priority.
    Auto,
    /// Stick to the manually selected source.
    Manual,
}

impl SbusMode {
    fn as_param(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Manual => 1,
        }
    }
}

impl BridgeClient {
    /// Get router state and per-source health.
    ///
    /// `GET /sbus/status`
    pub async fn sbus_status(&self) -> Result<SbusStatus, Error> {
        let url = self.url("sbus/status")?;
        debug!("fetching SBUS status");
        self.get(url).await
    }

    /// Select a source; the router switches to manual mode.
    ///
    /// `GET /sbus/set_source?source={id}`
    pub async fn set_sbus_source(&self, source: u8) -> Result<(), Error> {
        let url = self.url(&format!("sbus/set_source?source={source}"))?;
        debug!(source, "selecting SBUS source");
        let _: Ack = self.get_ack(url).await?;
        Ok(())
    }

    /// Switch between automatic and manual source selection.
    ///
    /// `GET /sbus/set_mode?mode={0|1}`
    pub async fn set_sbus_mode(&self, mode: SbusMode) -> Result<(), Error> {
        let url = self.url(&format!("sbus/set_mode?mode={}", mode.as_param()))?;
        debug!(?mode, "setting SBUS mode");
        let _: Ack = self.get_ack(url).await?;
        Ok(())
    }
}
