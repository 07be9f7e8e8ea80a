// ── Tracked settings ──
//
// The full set of user-editable fields, keyed by the console names the
// firmware's `/api/config` document uses. String fields hold the value as
// edited (numbers included); conversion to wire integers happens in `wire`.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::role::Slot;

/// Value of one tracked field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Names of every tracked field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum TrackedField {
    // Roles
    Device1Role,
    Device2Role,
    Device3Role,
    Device4Role,
    Device5Role,
    // UART
    Baudrate,
    Databits,
    Parity,
    Stopbits,
    Flowcontrol,
    // WiFi
    WifiMode,
    Ssid,
    Password,
    WifiApMode,
    WifiTxPower,
    WifiApChannel,
    MdnsHostname,
    WifiNetwork0Ssid,
    WifiNetwork0Pass,
    WifiNetwork1Ssid,
    WifiNetwork1Pass,
    WifiNetwork2Ssid,
    WifiNetwork2Pass,
    WifiNetwork3Ssid,
    WifiNetwork3Pass,
    WifiNetwork4Ssid,
    WifiNetwork4Pass,
    // Protocol
    ProtocolOptimization,
    MavlinkRouting,
    SbusTimingKeeper,
    // Device 4 network
    #[strum(serialize = "device4TargetIP")]
    Device4TargetIp,
    Device4TargetPort,
    Device4SbusFormat,
    Device4AutoBroadcast,
    Device4UdpTimeout,
    UdpBatching,
    // Output rates
    Device2OutRate,
    Device3OutRate,
    Device4OutRate,
    BtSendRate,
    // Log levels
    LogLevelWeb,
    LogLevelUart,
    LogLevelNetwork,
    // USB
    UsbMode,
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for TrackedField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl TrackedField {
    /// Console key, e.g. `device4TargetIP`.
    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn is_bool(self) -> bool {
        matches!(
            self,
            Self::Flowcontrol
                | Self::MavlinkRouting
                | Self::SbusTimingKeeper
                | Self::Device4AutoBroadcast
                | Self::UdpBatching
        )
    }

    /// The slot this field selects a role for, if it is a role field.
    pub fn role_slot(self) -> Option<Slot> {
        match self {
            Self::Device1Role => Some(Slot::D1),
            Self::Device2Role => Some(Slot::D2),
            Self::Device3Role => Some(Slot::D3),
            Self::Device4Role => Some(Slot::D4),
            Self::Device5Role => Some(Slot::D5),
            _ => None,
        }
    }

    /// Role field for `slot`.
    pub fn for_slot(slot: Slot) -> Self {
        match slot {
            Slot::D1 => Self::Device1Role,
            Slot::D2 => Self::Device2Role,
            Slot::D3 => Self::Device3Role,
            Slot::D4 => Self::Device4Role,
            Slot::D5 => Self::Device5Role,
        }
    }

    /// Secrets are masked in listings.
    pub fn is_secret(self) -> bool {
        matches!(
            self,
            Self::Password
                | Self::WifiNetwork0Pass
                | Self::WifiNetwork1Pass
                | Self::WifiNetwork2Pass
                | Self::WifiNetwork3Pass
                | Self::WifiNetwork4Pass
        )
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

/// One saved client-mode network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiNetwork {
    pub ssid: String,
    pub password: String,
}

/// Every tracked field, as currently edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    pub device1_role: String,
    pub device2_role: String,
    pub device3_role: String,
    pub device4_role: String,
    pub device5_role: String,

    pub baudrate: String,
    pub databits: String,
    pub parity: String,
    pub stopbits: String,
    pub flowcontrol: bool,

    pub wifi_mode: String,
    pub ssid: String,
    pub password: String,
    pub wifi_ap_mode: String,
    pub wifi_tx_power: String,
    pub wifi_ap_channel: String,
    pub mdns_hostname: String,
    pub wifi_networks: [WifiNetwork; 5],

    pub protocol_optimization: String,
    pub mavlink_routing: bool,
    pub sbus_timing_keeper: bool,

    #[serde(rename = "device4TargetIP")]
    pub device4_target_ip: String,
    pub device4_target_port: String,
    pub device4_sbus_format: String,
    pub device4_auto_broadcast: bool,
    pub device4_udp_timeout: String,
    pub udp_batching: bool,

    pub device2_out_rate: String,
    pub device3_out_rate: String,
    pub device4_out_rate: String,
    pub bt_send_rate: String,

    pub log_level_web: String,
    pub log_level_uart: String,
    pub log_level_network: String,

    pub usb_mode: String,
}

/// Text output rate (Hz) used when the device reports none.
pub const DEFAULT_OUT_RATE: &str = "50";

impl Default for Settings {
    fn default() -> Self {
        Self {
            device1_role: "0".into(),
            device2_role: "0".into(),
            device3_role: "0".into(),
            device4_role: "0".into(),
            device5_role: "0".into(),
            baudrate: "115200".into(),
            databits: "8".into(),
            parity: "N".into(),
            stopbits: "1".into(),
            flowcontrol: false,
            wifi_mode: "0".into(),
            ssid: String::new(),
            password: String::new(),
            wifi_ap_mode: "1".into(),
            wifi_tx_power: String::new(),
            wifi_ap_channel: String::new(),
            mdns_hostname: String::new(),
            wifi_networks: Default::default(),
            protocol_optimization: "0".into(),
            mavlink_routing: false,
            sbus_timing_keeper: false,
            device4_target_ip: "192.168.4.2".into(),
            device4_target_port: "14550".into(),
            device4_sbus_format: "0".into(),
            device4_auto_broadcast: false,
            device4_udp_timeout: "1000".into(),
            udp_batching: true,
            device2_out_rate: DEFAULT_OUT_RATE.into(),
            device3_out_rate: DEFAULT_OUT_RATE.into(),
            device4_out_rate: DEFAULT_OUT_RATE.into(),
            bt_send_rate: DEFAULT_OUT_RATE.into(),
            log_level_web: "1".into(),
            log_level_uart: "1".into(),
            log_level_network: "-1".into(),
            usb_mode: "device".into(),
        }
    }
}

impl Settings {
    /// Read one field.
    pub fn get(&self, field: TrackedField) -> FieldValue {
        if let Some(b) = self.bool_ref(field) {
            return FieldValue::Bool(*b);
        }
        FieldValue::Text(self.text(field).to_owned())
    }

    /// Write one field. Mismatched value kinds are ignored.
    pub fn set(&mut self, field: TrackedField, value: FieldValue) {
        match value {
            FieldValue::Bool(b) => {
                if let Some(slot) = self.bool_mut(field) {
                    *slot = b;
                }
            }
            FieldValue::Text(s) => {
                if let Some(slot) = self.text_mut(field) {
                    *slot = s;
                }
            }
        }
    }

    /// Role string of `slot`.
    pub fn role(&self, slot: Slot) -> &str {
        self.text(TrackedField::for_slot(slot))
    }

    /// Text value of a string field; `""` for boolean fields.
    pub fn text(&self, field: TrackedField) -> &str {
        match field {
            TrackedField::Device1Role => &self.device1_role,
            TrackedField::Device2Role => &self.device2_role,
            TrackedField::Device3Role => &self.device3_role,
            TrackedField::Device4Role => &self.device4_role,
            TrackedField::Device5Role => &self.device5_role,
            TrackedField::Baudrate => &self.baudrate,
            TrackedField::Databits => &self.databits,
            TrackedField::Parity => &self.parity,
            TrackedField::Stopbits => &self.stopbits,
            TrackedField::WifiMode => &self.wifi_mode,
            TrackedField::Ssid => &self.ssid,
            TrackedField::Password => &self.password,
            TrackedField::WifiApMode => &self.wifi_ap_mode,
            TrackedField::WifiTxPower => &self.wifi_tx_power,
            TrackedField::WifiApChannel => &self.wifi_ap_channel,
            TrackedField::MdnsHostname => &self.mdns_hostname,
            TrackedField::WifiNetwork0Ssid => &self.wifi_networks[0].ssid,
            TrackedField::WifiNetwork0Pass => &self.wifi_networks[0].password,
            TrackedField::WifiNetwork1Ssid => &self.wifi_networks[1].ssid,
            TrackedField::WifiNetwork1Pass => &self.wifi_networks[1].password,
            TrackedField::WifiNetwork2Ssid => &self.wifi_networks[2].ssid,
            TrackedField::WifiNetwork2Pass => &self.wifi_networks[2].password,
            TrackedField::WifiNetwork3Ssid => &self.wifi_networks[3].ssid,
            TrackedField::WifiNetwork3Pass => &self.wifi_networks[3].password,
            TrackedField::WifiNetwork4Ssid => &self.wifi_networks[4].ssid,
            TrackedField::WifiNetwork4Pass => &self.wifi_networks[4].password,
            TrackedField::ProtocolOptimization => &self.protocol_optimization,
            TrackedField::Device4TargetIp => &self.device4_target_ip,
            TrackedField::Device4TargetPort => &self.device4_target_port,
            TrackedField::Device4SbusFormat => &self.device4_sbus_format,
            TrackedField::Device4UdpTimeout => &self.device4_udp_timeout,
            TrackedField::Device2OutRate => &self.device2_out_rate,
            TrackedField::Device3OutRate => &self.device3_out_rate,
            TrackedField::Device4OutRate => &self.device4_out_rate,
            TrackedField::BtSendRate => &self.bt_send_rate,
            TrackedField::LogLevelWeb => &self.log_level_web,
            TrackedField::LogLevelUart => &self.log_level_uart,
            TrackedField::LogLevelNetwork => &self.log_level_network,
            TrackedField::UsbMode => &self.usb_mode,
            TrackedField::Flowcontrol
            | TrackedField::MavlinkRouting
            | TrackedField::SbusTimingKeeper
            | TrackedField::Device4AutoBroadcast
            | TrackedField::UdpBatching => "",
        }
    }

    fn text_mut(&mut self, field: TrackedField) -> Option<&mut String> {
        let slot = match field {
            TrackedField::Device1Role => &mut self.device1_role,
            TrackedField::Device2Role => &mut self.device2_role,
            TrackedField::Device3Role => &mut self.device3_role,
            TrackedField::Device4Role => &mut self.device4_role,
            TrackedField::Device5Role => &mut self.device5_role,
            TrackedField::Baudrate => &mut self.baudrate,
            TrackedField::Databits => &mut self.databits,
            TrackedField::Parity => &mut self.parity,
            TrackedField::Stopbits => &mut self.stopbits,
            TrackedField::WifiMode => &mut self.wifi_mode,
            TrackedField::Ssid => &mut self.ssid,
            TrackedField::Password => &mut self.password,
            TrackedField::WifiApMode => &mut self.wifi_ap_mode,
            TrackedField::WifiTxPower => &mut self.wifi_tx_power,
            TrackedField::WifiApChannel => &mut self.wifi_ap_channel,
            TrackedField::MdnsHostname => &mut self.mdns_hostname,
            TrackedField::WifiNetwork0Ssid => &mut self.wifi_networks[0].ssid,
            TrackedField::WifiNetwork0Pass => &mut self.wifi_networks[0].password,
            TrackedField::WifiNetwork1Ssid => &mut self.wifi_networks[1].ssid,
            TrackedField::WifiNetwork1Pass => &mut self.wifi_networks[1].password,
            TrackedField::WifiNetwork2Ssid => &mut self.wifi_networks[2].ssid,
            TrackedField::WifiNetwork2Pass => &mut self.wifi_networks[2].password,
            TrackedField::WifiNetwork3Ssid => &mut self.wifi_networks[3].ssid,
            TrackedField::WifiNetwork3Pass => &mut self.wifi_networks[3].password,
            TrackedField::WifiNetwork4Ssid => &mut self.wifi_networks[4].ssid,
            TrackedField::WifiNetwork4Pass => &mut self.wifi_networks[4].password,
            TrackedField::ProtocolOptimization => &mut self.protocol_optimization,
            TrackedField::Device4TargetIp => &mut self.device4_target_ip,
            TrackedField::Device4TargetPort => &mut self.device4_target_port,
            TrackedField::Device4SbusFormat => &mut self.device4_sbus_format,
            TrackedField::Device4UdpTimeout => &mut self.device4_udp_timeout,
            TrackedField::Device2OutRate => &mut self.device2_out_rate,
            TrackedField::Device3OutRate => &mut self.device3_out_rate,
            TrackedField::Device4OutRate => &mut self.device4_out_rate,
            TrackedField::BtSendRate => &mut self.bt_send_rate,
            TrackedField::LogLevelWeb => &mut self.log_level_web,
            TrackedField::LogLevelUart => &mut self.log_level_uart,
            TrackedField::LogLevelNetwork => &mut self.log_level_network,
            TrackedField::UsbMode => &mut self.usb_mode,
            TrackedField::Flowcontrol
            | TrackedField::MavlinkRouting
            | TrackedField::SbusTimingKeeper
            | TrackedField::Device4AutoBroadcast
            | TrackedField::UdpBatching => return None,
        };
        Some(slot)
    }

    fn bool_ref(&self, field: TrackedField) -> Option<&bool> {
        match field {
            TrackedField::Flowcontrol => Some(&self.flowcontrol),
            TrackedField::MavlinkRouting => Some(&self.mavlink_routing),
            TrackedField::SbusTimingKeeper => Some(&self.sbus_timing_keeper),
            TrackedField::Device4AutoBroadcast => Some(&self.device4_auto_broadcast),
            TrackedField::UdpBatching => Some(&self.udp_batching),
            _ => None,
        }
    }

    fn bool_mut(&mut self, field: TrackedField) -> Option<&mut bool> {
        match field {
            TrackedField::Flowcontrol => Some(&mut self.flowcontrol),
            TrackedField::MavlinkRouting => Some(&mut self.mavlink_routing),
            TrackedField::SbusTimingKeeper => Some(&mut self.sbus_timing_keeper),
            TrackedField::Device4AutoBroadcast => Some(&mut self.device4_auto_broadcast),
            TrackedField::UdpBatching => Some(&mut self.udp_batching),
            _ => None,
        }
    }

    /// Fields whose value differs from `other`, in declaration order.
    pub fn diff(&self, other: &Self) -> Vec<TrackedField> {
        TrackedField::all()
            .filter(|&f| self.get(f) != other.get(f))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn there_are_forty_four_tracked_fields() {
        assert_eq!(TrackedField::all().count(), 44);
        assert_eq!(TrackedField::all().filter(|f| f.is_bool()).count(), 5);
    }

    #[test]
    fn keys_match_console_names() {
        assert_eq!(TrackedField::Device1Role.key(), "device1Role");
        assert_eq!(TrackedField::Device4TargetIp.key(), "device4TargetIP");
        assert_eq!(TrackedField::WifiNetwork3Pass.key(), "wifiNetwork3Pass");
        assert_eq!(TrackedField::BtSendRate.key(), "btSendRate");
        assert_eq!(
            TrackedField::from_str("mdnsHostname").unwrap(),
            TrackedField::MdnsHostname
        );
        assert!(TrackedField::from_str("hostname").is_err());
    }

    #[test]
    fn every_key_round_trips() {
        for field in TrackedField::all() {
            assert_eq!(TrackedField::from_str(field.key()).unwrap(), field);
        }
    }

    #[test]
    fn serialized_names_match_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        let obj = json.as_object().unwrap();
        for field in TrackedField::all().filter(|f| !f.key().starts_with("wifiNetwork")) {
            assert!(obj.contains_key(field.key()), "{field}");
        }
    }

    #[test]
    fn get_set_by_field() {
        let mut s = Settings::default();
        s.set(TrackedField::WifiNetwork2Ssid, FieldValue::Text("lab".into()));
        s.set(TrackedField::UdpBatching, FieldValue::Bool(false));
        // Kind mismatch is ignored.
        s.set(TrackedField::Baudrate, FieldValue::Bool(true));

        assert_eq!(s.wifi_networks[2].ssid, "lab");
        assert_eq!(s.get(TrackedField::UdpBatching), FieldValue::Bool(false));
        assert_eq!(s.baudrate, "115200");
        assert_eq!(
            s.diff(&Settings::default()),
            vec![TrackedField::WifiNetwork2Ssid, TrackedField::UdpBatching]
        );
    }
}
