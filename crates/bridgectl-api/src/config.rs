// Configuration endpoints
//
// Reading the full settings document, saving it back (which restarts the
// device), factory reset, and the export/import pair used for backups.

use serde::Serialize;
use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::RebootOutcome;

impl BridgeClient {
    /// Read the full device configuration plus board information.
    ///
    /// `GET /api/config`
    ///
    /// Returned loosely typed: field spellings and presence vary across
    /// firmware versions, and `bridgectl-core` normalizes them.
    pub async fn get_config(&self) -> Result<serde_json::Value, Error> {
        let url = self.url("api/config")?;
        debug!("fetching device config");
        self.get(url).await
    }

    /// Submit a configuration. The device restarts when it accepts it.
    ///
    /// `POST /save` with a JSON body
    pub async fn save_config(&self, request: &impl Serialize) -> Result<RebootOutcome, Error> {
        let url = self.url("save")?;
        debug!("saving device config");
        self.post_reboot_json(url, request).await
    }

    /// Erase all settings and restart.
    ///
    /// `POST /config/reset`
    pub async fn factory_reset(&self) -> Result<RebootOutcome, Error> {
        let url = self.url("config/reset")?;
        debug!("requesting factory reset");
        self.post_reboot_empty(url).await
    }

    /// Download the configuration backup document.
    ///
    /// `GET /config/export`
    pub async fn export_config(&self) -> Result<serde_json::Value, Error> {
        let url = self.url("config/export")?;
        debug!("exporting device config");
        self.get(url).await
    }

    /// Upload a configuration backup. The device restarts on success.
    ///
    /// `POST /config/import` multipart field `config`
    pub async fn import_config(
        &self,
        contents: Vec<u8>,
        filename: &str,
    ) -> Result<RebootOutcome, Error> {
        let url = self.url("config/import")?;
        debug!(filename, bytes = contents.len(), "importing device config");

        let part = reqwest::multipart::Part::bytes(contents)
            .file_name(filename.to_owned())
            .mime_str("application/json")?;
        let form = reqwest::multipart::Form::new().part("config", part);

        self.post_reboot_multipart(url, form).await
    }
}
