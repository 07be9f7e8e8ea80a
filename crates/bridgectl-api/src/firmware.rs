// Firmware update endpoint

use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::RebootOutcome;

impl BridgeClient {
    /// Upload a firmware image. The device flashes it and restarts.
    ///
    /// `POST /update` multipart field `update`
    pub async fn upload_firmware(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<RebootOutcome, Error> {
        let url = self.url("update")?;
        debug!(filename, bytes = image.len(), "uploading firmware");

        let part = reqwest::multipart::Part::bytes(image)
            .file_name(filename.to_owned())
            .mime_str("application/octet-stream")?;
        let form = reqwest::multipart::Form::new().part("update", part);

        self.post_reboot_multipart(url, form).await
    }
}
