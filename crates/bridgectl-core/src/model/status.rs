use std::time::Duration;

use serde::Serialize;

/// Client-mode WiFi link state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WifiLink {
    pub connected: bool,
    pub ssid: String,
    pub ip_address: String,
    pub rssi_percent: i64,
    /// Temporary client mode entered from the boot button.
    pub temporary: bool,
}

/// Byte counters for one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SlotTraffic {
    pub rx: u64,
    pub tx: u64,
}

/// Runtime status as of one `/api/status` poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub device_name: String,
    pub version: String,
    pub uptime: Duration,
    pub free_ram: u64,
    pub wifi: WifiLink,
    pub bt_connected: bool,
    pub uart_config: String,
    pub flow_control: String,
    pub usb_mode: String,
    /// Human-readable role name per slot, slot 1 first.
    pub role_names: [String; 5],
    /// Traffic per slot, slot 1 first.
    pub traffic: [SlotTraffic; 5],
    pub device4_packets: SlotTraffic,
    pub total_traffic: u64,
    pub last_activity: String,
    pub protocol_stats: Option<serde_json::Value>,
}

impl StatusSnapshot {
    /// Uptime as `1d 02h 03m` / `02h 03m 04s` / `3m 04s`.
    pub fn uptime_display(&self) -> String {
        let secs = self.uptime.as_secs();
        let (d, h, m, s) = (secs / 86_400, (secs % 86_400) / 3600, (secs % 3600) / 60, secs % 60);
        if d > 0 {
            format!("{d}d {h:02}h {m:02}m")
        } else if h > 0 {
            format!("{h:02}h {m:02}m {s:02}s")
        } else {
            format!("{m}m {s:02}s")
        }
    }
}
