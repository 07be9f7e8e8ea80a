// ── API-to-domain type conversions ──
//
// Bridges raw `bridgectl_api` response types into `bridgectl_core::model`
// domain types: numeric codes become enums, epoch seconds become
// timestamps, per-slot counters are gathered into arrays.

use std::time::Duration;

use chrono::{DateTime, Utc};

use bridgectl_api::{CrashEntry, DeviceStatus, SbusSource, SbusStatus};

use crate::model::{
    CrashRecord, RouterMode, RouterState, SbusSnapshot, SbusSourceInfo, SlotTraffic,
    StatusSnapshot, WifiLink,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Epoch seconds to `DateTime<Utc>`; `0` (clock never synced) maps to `None`.
fn epoch_to_datetime(epoch: i64) -> Option<DateTime<Utc>> {
    if epoch <= 0 {
        return None;
    }
    DateTime::from_timestamp(epoch, 0)
}

/// Role names arrive as `"-"` or empty for unused slots.
fn role_name(raw: String) -> String {
    if raw.is_empty() { "-".into() } else { raw }
}

// ── Status ─────────────────────────────────────────────────────────

impl From<DeviceStatus> for StatusSnapshot {
    fn from(s: DeviceStatus) -> Self {
        Self {
            device_name: s.device_name,
            version: s.version,
            uptime: Duration::from_secs(s.uptime),
            free_ram: s.free_ram,
            wifi: WifiLink {
                connected: s.wifi_client_connected,
                ssid: s.connected_ssid,
                ip_address: s.ip_address,
                rssi_percent: s.rssi_percent,
                temporary: s.temp_network_mode,
            },
            bt_connected: s.bt_connected,
            uart_config: s.uart_config,
            flow_control: s.flow_control,
            usb_mode: s.usb_mode,
            role_names: [
                role_name(s.device1_role_name),
                role_name(s.device2_role_name),
                role_name(s.device3_role_name),
                role_name(s.device4_role_name),
                role_name(s.device5_role_name),
            ],
            traffic: [
                SlotTraffic { rx: s.device1_rx, tx: s.device1_tx },
                SlotTraffic { rx: s.device2_rx, tx: s.device2_tx },
                SlotTraffic { rx: s.device3_rx, tx: s.device3_tx },
                SlotTraffic { rx: s.device4_rx_bytes, tx: s.device4_tx_bytes },
                SlotTraffic { rx: s.device5_rx_bytes, tx: s.device5_tx_bytes },
            ],
            device4_packets: SlotTraffic {
                rx: s.device4_rx_packets,
                tx: s.device4_tx_packets,
            },
            total_traffic: s.total_traffic,
            last_activity: s.last_activity,
            protocol_stats: s.protocol_stats,
        }
    }
}

// ── SBUS ───────────────────────────────────────────────────────────

impl From<SbusSource> for SbusSourceInfo {
    fn from(s: SbusSource) -> Self {
        Self {
            id: s.id,
            name: s.name,
            configured: s.configured,
            quality: s.quality,
            priority: s.priority,
            has_data: s.has_data,
            valid: s.valid,
            has_failsafe: s.has_failsafe,
        }
    }
}

impl From<SbusStatus> for SbusSnapshot {
    fn from(s: SbusStatus) -> Self {
        Self {
            mode: if s.mode == 1 {
                RouterMode::Manual
            } else {
                RouterMode::Auto
            },
            state: match s.state {
                0 => RouterState::Ok,
                1 => RouterState::Hold,
                2 => RouterState::Failsafe,
                _ => RouterState::Unknown,
            },
            active_source: s.active_source,
            sources: s.sources.into_iter().map(Into::into).collect(),
            frames_routed: s.frames_routed,
            repeated_frames: s.repeated_frames,
        }
    }
}

// ── Crash log ──────────────────────────────────────────────────────

impl From<CrashEntry> for CrashRecord {
    fn from(e: CrashEntry) -> Self {
        Self {
            number: e.num,
            reason: e.reason,
            uptime_secs: e.uptime,
            heap: e.heap,
            min_heap: e.min_heap,
            at: epoch_to_datetime(e.time),
            version: e.version.filter(|v| !v.is_empty()),
            panic: e.panic,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn crash_without_clock_has_no_timestamp() {
        let record: CrashRecord = CrashEntry {
            num: 4,
            reason: "Brownout".into(),
            time: 0,
            version: Some(String::new()),
            ..CrashEntry::default()
        }
        .into();
        assert!(record.at.is_none());
        assert!(record.version.is_none());

        let record: CrashRecord = CrashEntry {
            time: 1_700_000_000,
            ..CrashEntry::default()
        }
        .into();
        assert_eq!(record.at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn router_codes_become_enums() {
        let snap: SbusSnapshot = SbusStatus {
            mode: 1,
            state: 2,
            active_source: 2,
            sources: vec![SbusSource {
                id: 2,
                name: "Device4 (UDP)".into(),
                ..SbusSource::default()
            }],
            ..SbusStatus::default()
        }
        .into();
        assert_eq!(snap.mode, RouterMode::Manual);
        assert_eq!(snap.state, RouterState::Failsafe);
        assert_eq!(snap.active().unwrap().name, "Device4 (UDP)");
    }

    #[test]
    fn status_groups_counters_by_slot() {
        let snap: StatusSnapshot = DeviceStatus {
            uptime: 90_061,
            device2_rx: 7,
            device4_tx_bytes: 9,
            device2_role_name: "USB".into(),
            ..DeviceStatus::default()
        }
        .into();
        assert_eq!(snap.traffic[1].rx, 7);
        assert_eq!(snap.traffic[3].tx, 9);
        assert_eq!(snap.role_names[1], "USB");
        assert_eq!(snap.role_names[0], "-");
        assert_eq!(snap.uptime_display(), "1d 01h 01m");
    }
}
