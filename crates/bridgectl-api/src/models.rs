// Bridge API response types
//
// Models for the firmware's JSON endpoints. Fields use `#[serde(default)]`
// liberally: older firmware omits whole groups (device 4 counters, protocol
// statistics, SBUS sources) depending on the active roles.

use serde::{Deserialize, Serialize};

// ── Acknowledgement ──────────────────────────────────────────────────

/// The `{ "status": "ok" | "error" | "unchanged", "message": ... }` reply
/// most command endpoints send.
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl Ack {
    /// Convert a `status: "error"` reply into `Error::Rejected`.
    pub(crate) fn into_result(self) -> Result<Self, crate::Error> {
        if self.status == "error" {
            return Err(crate::Error::Rejected {
                message: self.message.unwrap_or_else(|| "request failed".into()),
            });
        }
        Ok(self)
    }
}

/// How the device answered a request that may reboot it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebootOutcome {
    /// The device accepted the request and is about to restart.
    Accepted { message: String },
    /// Nothing changed; the device will not restart.
    Unchanged { message: String },
    /// The connection dropped or the reply was not JSON: the device is
    /// already restarting.
    Rebooting,
}

impl RebootOutcome {
    /// Whether the device is going down as a result of the request.
    pub fn reboots(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// Runtime snapshot from `GET /api/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceStatus {
    pub device_name: String,
    pub version: String,
    pub uptime: u64,
    pub free_ram: u64,

    pub wifi_mode: i64,
    pub wifi_client_connected: bool,
    pub connected_ssid: String,
    pub ip_address: String,
    pub rssi_percent: i64,
    pub temp_network_mode: bool,

    pub bt_initialized: bool,
    pub bt_connected: bool,

    pub uart_config: String,
    pub flow_control: String,
    pub usb_mode: String,

    pub device1_role_name: String,
    pub device2_role_name: String,
    pub device3_role_name: String,
    pub device4_role_name: String,
    pub device5_role_name: String,

    pub device1_rx: u64,
    pub device1_tx: u64,
    pub device2_rx: u64,
    pub device2_tx: u64,
    pub device3_rx: u64,
    pub device3_tx: u64,
    pub device4_tx_bytes: u64,
    pub device4_tx_packets: u64,
    pub device4_rx_bytes: u64,
    pub device4_rx_packets: u64,
    pub device5_rx_bytes: u64,
    pub device5_tx_bytes: u64,

    pub total_traffic: u64,
    pub last_activity: String,
    pub protocol_optimization: i64,
    pub protocol_stats: Option<serde_json::Value>,
}

// ── Logs ─────────────────────────────────────────────────────────────

/// Reply of `GET /logs`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<String>,
}

// ── Crash log ────────────────────────────────────────────────────────

/// Reply of `GET /crashlog_json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrashLog {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub entries: Vec<CrashEntry>,
}

/// One recorded abnormal reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrashEntry {
    pub num: u64,
    pub reason: String,
    /// Uptime in seconds before the reset.
    pub uptime: u64,
    pub heap: u64,
    pub min_heap: u64,
    /// Unix time of the reset, `0` when the clock was never synced.
    pub time: i64,
    pub version: Option<String>,
    pub panic: Option<serde_json::Value>,
}

// ── SBUS ─────────────────────────────────────────────────────────────

/// Reply of `GET /sbus/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SbusStatus {
    /// `0` = auto, `1` = manual.
    pub mode: u8,
    /// `0` = ok, `1` = hold, `2` = failsafe.
    pub state: u8,
    pub active_source: u8,
    pub sources: Vec<SbusSource>,
    pub frames_routed: u64,
    pub repeated_frames: u64,
}

/// One configured SBUS input as seen by the router.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SbusSource {
    pub id: u8,
    pub name: String,
    pub configured: bool,
    pub quality: u8,
    pub priority: u8,
    pub has_data: bool,
    pub valid: bool,
    pub has_failsafe: bool,
}
