// Log and crash-log endpoints

use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{Ack, CrashLog, LogsResponse};

impl BridgeClient {
    /// Fetch the recent log lines buffered on the device.
    ///
    /// `GET /logs`
    pub async fn get_logs(&self) -> Result<Vec<String>, Error> {
        let url = self.url("logs")?;
        debug!("fetching logs");
        let resp: LogsResponse = self.get(url).await?;
        Ok(resp.logs)
    }

    /// Fetch the persisted crash history.
    ///
    /// `GET /crashlog_json`
    pub async fn get_crash_log(&self) -> Result<CrashLog, Error> {
        let url = self.url("crashlog_json")?;
        debug!("fetching crash log");
        self.get(url).await
    }

    /// Erase the crash history.
    ///
    /// `GET /clear_crashlog`
    pub async fn clear_crash_log(&self) -> Result<(), Error> {
        let url = self.url("clear_crashlog")?;
        debug!("clearing crash log");
        let _: Ack = self.get_ack(url).await?;
        Ok(())
    }
}
