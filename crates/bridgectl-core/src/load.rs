// ── Device config loading ──
//
// `GET /api/config` is loosely typed: numbers may arrive as strings, fields
// come and go between firmware versions, and a couple of keys have legacy
// spellings. Each field has one of two fallback behaviours:
//
//   * missing or null takes the default (`or_null`), so `0`, `false` and
//     `""` are kept as sent;
//   * any falsy value takes the default (`or_falsy`).
//
// Legacy spellings are consulted left to right, first usable value wins.

use serde_json::Value;

use crate::model::BoardInfo;
use crate::role::{RoleValue, Slot};
use crate::settings::{DEFAULT_OUT_RATE, Settings};

// ── JSON coercions ──────────────────────────────────────────────────

/// Present and not null.
fn present<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

/// JavaScript truthiness.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.is_normal() || f.is_subnormal()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// String form of a scalar, the way the console stringifies it.
fn stringify(v: &Value) -> String {
    match v {
        Value::Null => "null".into(),
        Value::Bool(b) => b.to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // Integral floats print without a fraction ("115200", not "115200.0").
                let f = n.as_f64().unwrap_or_default();
                if f.fract().abs() < f64::EPSILON && f.abs() < 1e15 {
                    format!("{f:.0}")
                } else {
                    f.to_string()
                }
            }
        }
        Value::Array(_) | Value::Object(_) => v.to_string(),
    }
}

/// First key (in order) whose value is present and not null, stringified.
fn or_null(data: &Value, keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|k| present(data, k))
        .map_or_else(|| default.to_owned(), stringify)
}

/// First key (in order) whose value is truthy, stringified.
fn or_falsy(data: &Value, keys: &[&str], default: &str) -> String {
    keys.iter()
        .find_map(|k| data.get(*k).filter(|v| truthy(v)))
        .map_or_else(|| default.to_owned(), stringify)
}

fn bool_or_null(data: &Value, key: &str, default: bool) -> bool {
    present(data, key).map_or(default, truthy)
}

// ── Roles ───────────────────────────────────────────────────────────

/// Role string for `slot`, joining a bare composite base with the
/// separately reported format field.
fn load_role(data: &Value, slot: Slot, format_key: Option<&str>) -> String {
    let key = match slot {
        Slot::D1 => "device1Role",
        Slot::D2 => "device2Role",
        Slot::D3 => "device3Role",
        Slot::D4 => "device4Role",
        Slot::D5 => "device5Role",
    };
    let raw = or_null(data, &[key], "0");
    let mut role = RoleValue::decode(&raw);
    if let Some(format_key) = format_key {
        if slot.is_composite(&role.base) && !raw.contains('_') {
            role.format = or_null(data, &[format_key], "0");
        }
    }
    role.encode(slot)
}

// ── Entry point ─────────────────────────────────────────────────────

/// Build tracked settings and board info from an `/api/config` document.
pub fn settings_from_device(data: &Value) -> (Settings, BoardInfo) {
    let mut s = Settings {
        device1_role: load_role(data, Slot::D1, None),
        device2_role: load_role(data, Slot::D2, None),
        device3_role: load_role(data, Slot::D3, Some("device3SbusFormat")),
        device4_role: load_role(data, Slot::D4, Some("device4SbusFormat")),
        device5_role: load_role(data, Slot::D5, None),

        device4_target_ip: or_falsy(data, &["device4TargetIp", "device4TargetIP"], "192.168.4.2"),
        device4_target_port: or_null(data, &["device4Port", "device4TargetPort"], "14550"),
        device4_sbus_format: or_null(data, &["device4SbusFormat"], "0"),
        device4_auto_broadcast: bool_or_null(data, "device4AutoBroadcast", false),
        device4_udp_timeout: or_null(data, &["device4UdpTimeout"], "1000"),
        udp_batching: bool_or_null(data, "udpBatchingEnabled", true),

        usb_mode: or_falsy(data, &["usbMode"], "device"),

        baudrate: or_null(data, &["baudrate"], "115200"),
        databits: or_null(data, &["databits"], "8"),
        parity: or_falsy(data, &["parity"], "N"),
        stopbits: or_null(data, &["stopbits"], "1"),
        flowcontrol: data.get("flowcontrol").is_some_and(truthy),

        wifi_mode: or_null(data, &["wifiMode"], "0"),
        ssid: or_falsy(data, &["ssid"], ""),
        password: or_falsy(data, &["password"], ""),
        wifi_ap_mode: or_null(data, &["wifiApMode"], "1"),
        wifi_tx_power: or_null(data, &["wifiTxPower"], ""),
        wifi_ap_channel: or_null(data, &["wifiApChannel"], ""),
        mdns_hostname: or_falsy(data, &["mdnsHostname"], ""),

        protocol_optimization: or_null(data, &["protocolOptimization"], "0"),
        mavlink_routing: bool_or_null(data, "mavlinkRouting", false),
        sbus_timing_keeper: bool_or_null(data, "sbusTimingKeeper", false),

        log_level_web: or_null(data, &["logLevelWeb"], "1"),
        log_level_uart: or_null(data, &["logLevelUart"], "1"),
        log_level_network: or_null(data, &["logLevelNetwork"], "-1"),

        // Zero is not a valid rate, so falsy falls back too.
        device2_out_rate: or_falsy(data, &["device2OutRate"], DEFAULT_OUT_RATE),
        device3_out_rate: or_falsy(data, &["device3OutRate"], DEFAULT_OUT_RATE),
        device4_out_rate: or_falsy(data, &["device4OutRate"], DEFAULT_OUT_RATE),
        bt_send_rate: or_falsy(data, &["btSendRate"], DEFAULT_OUT_RATE),

        wifi_networks: Default::default(),
    };

    if let Some(networks) = data.get("wifiNetworks").and_then(Value::as_array) {
        for (slot, net) in s.wifi_networks.iter_mut().zip(networks) {
            slot.ssid = or_falsy(net, &["ssid"], "");
            slot.password = or_falsy(net, &["password"], "");
        }
    }

    let board = BoardInfo {
        board_type: or_falsy(data, &["boardType"], "s3zero"),
        version: or_falsy(data, &["version"], ""),
        arduino_version: or_falsy(data, &["arduinoVersion"], ""),
        idf_version: or_falsy(data, &["idfVersion"], ""),
        device_name: or_falsy(data, &["deviceName"], "UART Bridge"),
        default_hostname: or_falsy(data, &["defaultHostname"], ""),
        usb_host_supported: bool_or_null(data, "usbHostSupported", true),
        uart2_available: bool_or_null(data, "uart2Available", true),
        sbus_mavlink_enabled: bool_or_null(data, "sbusMavlinkEnabled", false),
        bt_supported: bool_or_null(data, "btSupported", false),
        ble_supported: bool_or_null(data, "bleSupported", false),
        log_display_count: present(data, "logDisplayCount")
            .and_then(Value::as_u64)
            .unwrap_or(30),
    };

    (s, board)
}
