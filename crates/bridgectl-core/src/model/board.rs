use serde::Serialize;

use crate::resolver::BoardCaps;

/// Board identity and hardware capabilities reported by `/api/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct BoardInfo {
    /// `s3zero`, `supermini`, `xiao`, `minikit`, `minikit_bt`.
    pub board_type: String,
    pub version: String,
    pub arduino_version: String,
    pub idf_version: String,
    pub device_name: String,
    pub default_hostname: String,
    pub usb_host_supported: bool,
    pub uart2_available: bool,
    pub sbus_mavlink_enabled: bool,
    pub bt_supported: bool,
    pub ble_supported: bool,
    /// Number of log lines the device keeps for display.
    pub log_display_count: u64,
}

impl Default for BoardInfo {
    fn default() -> Self {
        Self {
            board_type: "s3zero".into(),
            version: String::new(),
            arduino_version: String::new(),
            idf_version: String::new(),
            device_name: "UART Bridge".into(),
            default_hostname: String::new(),
            usb_host_supported: true,
            uart2_available: true,
            sbus_mavlink_enabled: false,
            bt_supported: false,
            ble_supported: false,
            log_display_count: 30,
        }
    }
}

impl BoardInfo {
    pub fn caps(&self) -> BoardCaps {
        BoardCaps {
            uart2_available: self.uart2_available,
            bt_supported: self.bt_supported,
            ble_supported: self.ble_supported,
        }
    }

    pub fn is_minikit(&self) -> bool {
        matches!(self.board_type.as_str(), "minikit" | "minikit_bt")
    }

    /// Slot 5 exists only on boards with a Bluetooth radio.
    pub fn has_device5(&self) -> bool {
        self.bt_supported || self.ble_supported
    }
}
