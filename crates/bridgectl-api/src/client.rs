// Bridge HTTP client
//
// Wraps `reqwest::Client` with URL construction against the device root and
// the three response shapes the firmware produces: typed JSON documents,
// `{ status, message }` acknowledgements, and the dropped or non-JSON replies
// of a device that is already rebooting. Endpoint groups live in separate
// files as inherent methods.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Ack, RebootOutcome};
use crate::transport::TransportConfig;

/// Whole-request bound for multipart uploads (firmware images, backups),
/// which outlast the ordinary request timeout over the device's WiFi.
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Raw HTTP client for the bridge firmware's web API.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted,
/// so pollers and the reconnector each hold their own copy.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    http: reqwest::Client,
    base_url: Url,
}

impl BridgeClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the device root, e.g. `http://192.168.4.1` or
    /// `http://uart-bridge.local`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a device path such as `api/status`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        Self::parse_json(resp).await
    }

    /// Send a GET request whose reply is a `{ status, message }` acknowledgement.
    pub(crate) async fn get_ack(&self, url: Url) -> Result<Ack, Error> {
        let ack: Ack = self.get(url).await?;
        ack.into_result()
    }

    /// Send a POST request with a JSON body to a reboot-inducing endpoint.
    pub(crate) async fn post_reboot_json(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<RebootOutcome, Error> {
        debug!("POST {}", url);

        let result = self.http.post(url).json(body).send().await;
        Self::classify_reboot(result).await
    }

    /// Send a bodiless POST to a reboot-inducing endpoint.
    pub(crate) async fn post_reboot_empty(&self, url: Url) -> Result<RebootOutcome, Error> {
        debug!("POST {}", url);

        let result = self.http.post(url).send().await;
        Self::classify_reboot(result).await
    }

    /// Send a multipart upload to a reboot-inducing endpoint.
    pub(crate) async fn post_reboot_multipart(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<RebootOutcome, Error> {
        debug!("POST {} (multipart)", url);

        let result = self
            .http
            .post(url)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await;
        Self::classify_reboot(result).await
    }

    // ── Response parsing ─────────────────────────────────────────────

    /// Decode a JSON body, turning non-2xx statuses into `Error::Http`.
    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: device_message(&body)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })
    }

    /// Interpret the reply to a request that may reboot the device.
    ///
    /// A connection dropped after the request went out, or a non-JSON
    /// reply, means the device went down mid-response, which is success
    /// for these endpoints. A refused connection is a plain error.
    async fn classify_reboot(
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<RebootOutcome, Error> {
        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                let err = Error::Transport(e);
                if err.is_reboot_signal() {
                    debug!(error = %err, "connection dropped mid-request, assuming reboot");
                    return Ok(RebootOutcome::Rebooting);
                }
                return Err(err);
            }
        };

        let status = resp.status();
        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        if !is_json {
            debug!(status = status.as_u16(), "non-JSON reply, assuming reboot");
            return Ok(RebootOutcome::Rebooting);
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "body cut off, assuming reboot");
                return Ok(RebootOutcome::Rebooting);
            }
        };

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: device_message(&body)
                    .unwrap_or_else(|| format!("Save failed: {}", status.as_u16())),
            });
        }

        let ack: Ack = serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: body.clone(),
        })?;

        match ack.status.as_str() {
            "unchanged" => Ok(RebootOutcome::Unchanged {
                message: ack.message.unwrap_or_default(),
            }),
            "error" => Err(Error::Rejected {
                message: ack
                    .message
                    .unwrap_or_else(|| "Configuration error".into()),
            }),
            _ => Ok(RebootOutcome::Accepted {
                message: ack.message.unwrap_or_default(),
            }),
        }
    }
}

/// Pull `message` out of an error body, if the body is JSON and has one.
fn device_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_relative_to_root() {
        let client = BridgeClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://192.168.4.1").unwrap(),
        );
        assert_eq!(
            client.url("/api/status").unwrap().as_str(),
            "http://192.168.4.1/api/status"
        );
        assert_eq!(
            client.url("sbus/set_source?source=2").unwrap().as_str(),
            "http://192.168.4.1/sbus/set_source?source=2"
        );
    }

    #[test]
    fn device_message_extraction() {
        assert_eq!(
            device_message(r#"{"status":"error","message":"Client SSID cannot be empty"}"#),
            Some("Client SSID cannot be empty".into())
        );
        assert_eq!(device_message(r#"{"status":"error","message":""}"#), None);
        assert_eq!(device_message("<html>oops</html>"), None);
    }
}
