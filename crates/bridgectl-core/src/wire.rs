// ── Save request body ──
//
// `POST /save` takes snake_case keys with integers where the settings hold
// numeric strings. Composite roles split into a role and a format field.

use serde::Serialize;

use crate::role::RoleValue;
use crate::settings::Settings;

/// One client-mode network entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireNetwork {
    pub ssid: String,
    pub password: String,
}

/// Body of `POST /save`. Numeric fields are `None` (sent as `null`) when
/// the setting does not start with a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct WireRequest {
    pub device1_role: Option<i64>,
    pub device2_role: Option<i64>,
    pub device2_out_rate: Option<i64>,
    pub device3_role: Option<i64>,
    pub device3_sbus_format: Option<i64>,
    pub device3_out_rate: Option<i64>,
    pub device4_role: Option<i64>,
    pub device4_sbus_format: Option<i64>,
    pub device4_out_rate: Option<i64>,
    pub device5_role: Option<i64>,
    pub bt_send_rate: Option<i64>,

    pub baudrate: Option<i64>,
    pub databits: Option<i64>,
    pub parity: String,
    pub stopbits: Option<i64>,
    /// `0` or `1`.
    pub flowcontrol: u8,

    pub wifi_mode: Option<i64>,
    /// The AP SSID is always the hostname.
    pub ssid: String,
    pub password: String,
    pub wifi_ap_mode: Option<i64>,
    pub wifi_tx_power: Option<i64>,
    pub wifi_ap_channel: Option<i64>,
    pub mdns_hostname: String,
    pub wifi_networks: Vec<WireNetwork>,

    pub protocol_optimization: Option<i64>,
    pub mavlink_routing: bool,
    pub udp_batching: bool,

    pub log_level_web: Option<i64>,
    pub log_level_uart: Option<i64>,
    pub log_level_network: Option<i64>,

    pub device4_target_ip: String,
    pub device4_port: Option<i64>,
    pub device4_auto_broadcast: bool,
    pub device4_udp_timeout: Option<i64>,

    pub usbmode: String,
}

/// Leading-integer parse: optional sign then digits, trailing junk ignored.
/// `None` when no digits lead.
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

impl WireRequest {
    /// Build the request body. Reads `s` only.
    pub fn from_settings(s: &Settings) -> Self {
        let d3 = RoleValue::decode(&s.device3_role);
        let d4 = RoleValue::decode(&s.device4_role);

        Self {
            device1_role: parse_int(&s.device1_role),
            device2_role: parse_int(&s.device2_role),
            device2_out_rate: parse_int(&s.device2_out_rate),
            device3_role: parse_int(&d3.base),
            device3_sbus_format: parse_int(&d3.format),
            device3_out_rate: parse_int(&s.device3_out_rate),
            device4_role: parse_int(&d4.base),
            device4_sbus_format: parse_int(&d4.format),
            device4_out_rate: parse_int(&s.device4_out_rate),
            device5_role: parse_int(&s.device5_role),
            bt_send_rate: parse_int(&s.bt_send_rate),

            baudrate: parse_int(&s.baudrate),
            databits: parse_int(&s.databits),
            parity: s.parity.clone(),
            stopbits: parse_int(&s.stopbits),
            flowcontrol: u8::from(s.flowcontrol),

            wifi_mode: parse_int(&s.wifi_mode),
            ssid: s.mdns_hostname.clone(),
            password: s.password.clone(),
            wifi_ap_mode: parse_int(&s.wifi_ap_mode),
            wifi_tx_power: parse_int(&s.wifi_tx_power),
            wifi_ap_channel: parse_int(&s.wifi_ap_channel),
            mdns_hostname: s.mdns_hostname.clone(),
            wifi_networks: s
                .wifi_networks
                .iter()
                .map(|n| WireNetwork {
                    ssid: n.ssid.clone(),
                    password: n.password.clone(),
                })
                .collect(),

            protocol_optimization: parse_int(&s.protocol_optimization),
            mavlink_routing: s.mavlink_routing,
            udp_batching: s.udp_batching,

            log_level_web: parse_int(&s.log_level_web),
            log_level_uart: parse_int(&s.log_level_uart),
            log_level_network: parse_int(&s.log_level_network),

            device4_target_ip: s.device4_target_ip.clone(),
            device4_port: parse_int(&s.device4_target_port),
            device4_auto_broadcast: s.device4_auto_broadcast,
            device4_udp_timeout: parse_int(&s.device4_udp_timeout),

            usbmode: s.usb_mode.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn leading_integer_parse() {
        assert_eq!(parse_int("115200"), Some(115_200));
        assert_eq!(parse_int("-1"), Some(-1));
        assert_eq!(parse_int("  42abc"), Some(42));
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int("-"), None);
    }

    #[test]
    fn composite_roles_split() {
        let s = Settings {
            device3_role: "5_1".into(),
            device4_role: "3_0".into(),
            ..Settings::default()
        };
        let wire = WireRequest::from_settings(&s);
        assert_eq!(wire.device3_role, Some(5));
        assert_eq!(wire.device3_sbus_format, Some(1));
        assert_eq!(wire.device4_role, Some(3));
        assert_eq!(wire.device4_sbus_format, Some(0));
    }

    #[test]
    fn serialized_shape() {
        let mut s = Settings {
            flowcontrol: true,
            mdns_hostname: "bridge".into(),
            wifi_tx_power: String::new(),
            ..Settings::default()
        };
        s.wifi_networks[0].ssid = "home".into();

        let value = serde_json::to_value(WireRequest::from_settings(&s)).unwrap();
        assert_eq!(value["flowcontrol"], json!(1));
        assert_eq!(value["ssid"], json!("bridge"));
        assert_eq!(value["mdns_hostname"], json!("bridge"));
        assert_eq!(value["wifi_tx_power"], json!(null));
        assert_eq!(value["baudrate"], json!(115_200));
        assert_eq!(value["log_level_network"], json!(-1));
        assert_eq!(value["udp_batching"], json!(true));
        assert_eq!(value["usbmode"], json!("device"));
        assert_eq!(value["device4_port"], json!(14550));
        assert_eq!(value["wifi_networks"].as_array().unwrap().len(), 5);
        assert_eq!(value["wifi_networks"][0]["ssid"], json!("home"));
        assert_eq!(value.as_object().unwrap().len(), 35);
    }

    #[test]
    fn building_does_not_touch_settings() {
        let s = Settings::default();
        let before = s.clone();
        let _ = WireRequest::from_settings(&s);
        assert_eq!(s, before);
    }
}
