// ── Configuration state ──
//
// The working copy of the device settings plus the last copy the device
// confirmed. Edits go through `set_fields`, which applies the raw values
// and then runs the role auto-correction in the same call.

use serde::Serialize;
use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::error::CoreError;
use crate::load::settings_from_device;
use crate::model::BoardInfo;
use crate::resolver::{self, RoleOption};
use crate::role::{RoleSet, RoleValue, Slot, canonicalize};
use crate::settings::{FieldValue, Settings, TrackedField};
use crate::validate::{ValidationError, validate};
use crate::wire::WireRequest;

/// One field that differs from the confirmed snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: TrackedField,
    pub from: FieldValue,
    pub to: FieldValue,
}

/// Derived SBUS/CRSF flags for the current role selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct RoleSummary {
    pub sbus_active_upstream: bool,
    pub sbus_active: bool,
    pub crsf_active: bool,
    pub has_sbus_input: bool,
    pub has_sbus_output: bool,
    pub sbus_warning: bool,
}

/// Parse a user-supplied boolean.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings being edited, against the snapshot the device last confirmed.
#[derive(Debug, Clone, Default)]
pub struct ConfigState {
    current: Settings,
    original: Option<Settings>,
    board: BoardInfo,
}

impl ConfigState {
    /// State built from an `/api/config` document, already snapshotted.
    pub fn from_device(payload: &Value) -> Self {
        let mut state = Self::default();
        state.load_from_device(payload);
        state
    }

    /// Replace everything with the device's view and take the snapshot.
    pub fn load_from_device(&mut self, payload: &Value) {
        let (settings, board) = settings_from_device(payload);
        self.current = settings;
        self.board = board;
        self.snapshot();
        debug!(board = %self.board.board_type, "configuration loaded");
    }

    pub fn is_loaded(&self) -> bool {
        self.original.is_some()
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    /// Last confirmed settings, if anything was loaded yet.
    pub fn original(&self) -> Option<&Settings> {
        self.original.as_ref()
    }

    pub fn board(&self) -> &BoardInfo {
        &self.board
    }

    // ── Dirty tracking ───────────────────────────────────────────────

    /// `false` until loaded; afterwards, whether any tracked field changed.
    pub fn is_dirty(&self) -> bool {
        self.original
            .as_ref()
            .is_some_and(|original| *original != self.current)
    }

    /// Changed fields with their confirmed and current values.
    pub fn dirty_fields(&self) -> Vec<FieldChange> {
        let Some(original) = &self.original else {
            return Vec::new();
        };
        self.current
            .diff(original)
            .into_iter()
            .map(|field| FieldChange {
                field,
                from: original.get(field),
                to: self.current.get(field),
            })
            .collect()
    }

    /// Discard edits.
    pub fn reset(&mut self) {
        if let Some(original) = &self.original {
            self.current = original.clone();
        }
    }

    /// Accept the current values as confirmed.
    pub fn snapshot(&mut self) {
        self.original = Some(self.current.clone());
    }

    /// Accept `submitted` as confirmed. Edits made after it was taken
    /// stay dirty against it.
    pub fn confirm(&mut self, submitted: Settings) {
        self.original = Some(submitted);
    }

    // ── Editing ──────────────────────────────────────────────────────

    /// Parse `key` and apply `raw` to it. See [`Self::set_fields`].
    pub fn set(&mut self, key: &str, raw: &str) -> Result<Vec<TrackedField>, CoreError> {
        let field: TrackedField = key.parse().map_err(|_| CoreError::UnknownField {
            name: key.to_owned(),
        })?;
        self.set_fields(&[(field, raw.to_owned())])
    }

    pub fn set_field(
        &mut self,
        field: TrackedField,
        raw: &str,
    ) -> Result<Vec<TrackedField>, CoreError> {
        self.set_fields(&[(field, raw.to_owned())])
    }

    /// Apply a batch of edits, then auto-correct once if any role or the
    /// protocol mode changed. SBUS and CRSF protocol modes follow the roles,
    /// so a direct protocol edit is corrected like a role edit.
    ///
    /// All values are checked before anything is written, so a bad value
    /// leaves the state untouched. Returns the fields that changed as a
    /// side effect (port defaults, role corrections, protocol mode).
    pub fn set_fields(
        &mut self,
        edits: &[(TrackedField, String)],
    ) -> Result<Vec<TrackedField>, CoreError> {
        let parsed = edits
            .iter()
            .map(|(field, raw)| Ok((*field, self.parse_value(*field, raw)?)))
            .collect::<Result<Vec<_>, CoreError>>()?;

        let mut next = self.current.clone();
        let mut needs_correction = false;

        for (field, value) in parsed {
            if field == TrackedField::Device4Role {
                let old = RoleValue::decode(&next.device4_role);
                if let FieldValue::Text(raw) = &value {
                    if let Some(port) = resolver::port_default(&old, &RoleValue::decode(raw)) {
                        port.clone_into(&mut next.device4_target_port);
                    }
                }
            }
            needs_correction |=
                field.role_slot().is_some() || field == TrackedField::ProtocolOptimization;
            next.set(field, value);
        }

        let edited: Vec<TrackedField> = edits.iter().map(|(f, _)| *f).collect();
        let assigned = next.clone();

        if needs_correction {
            Self::correct(&mut next);
        }

        // Side effects: anything that moved other than the explicit edits,
        // plus edited fields the correction overrode.
        let touched: Vec<TrackedField> = next
            .diff(&self.current)
            .into_iter()
            .filter(|f| !edited.contains(f) || next.get(*f) != assigned.get(*f))
            .collect();

        if !touched.is_empty() {
            debug!(fields = ?touched, "auto-corrected");
        }
        self.current = next;
        Ok(touched)
    }

    /// Check a raw value for `field` and convert it.
    fn parse_value(&self, field: TrackedField, raw: &str) -> Result<FieldValue, CoreError> {
        if field.is_bool() {
            return parse_bool(raw)
                .map(FieldValue::Bool)
                .ok_or_else(|| CoreError::InvalidValue {
                    field: field.key().to_owned(),
                    reason: format!("expected true or false, got '{raw}'"),
                });
        }

        if let Some(slot) = field.role_slot() {
            let canonical = canonicalize(slot, raw);
            let known = resolver::known_values(slot);
            if !known.contains(&canonical.as_str()) {
                return Err(CoreError::InvalidValue {
                    field: field.key().to_owned(),
                    reason: format!("'{raw}' is not a role of {slot} (one of {})", known.join(", ")),
                });
            }
            if slot == Slot::D5 && canonical != "0" && !self.board.has_device5() {
                return Err(CoreError::InvalidValue {
                    field: field.key().to_owned(),
                    reason: "this board has no Bluetooth radio".into(),
                });
            }
            return Ok(FieldValue::Text(canonical));
        }

        Ok(FieldValue::Text(raw.to_owned()))
    }

    /// Run the role auto-correction over `s`.
    fn correct(s: &mut Settings) {
        let mut roles = roles_of(s);
        resolver::auto_correct(&mut roles, &mut s.protocol_optimization);
        for slot in Slot::iter() {
            s.set(
                TrackedField::for_slot(slot),
                FieldValue::Text(roles.encoded(slot)),
            );
        }
    }

    // ── Derived views ────────────────────────────────────────────────

    /// Current roles, decoded.
    pub fn roles(&self) -> RoleSet {
        roles_of(&self.current)
    }

    pub fn role_summary(&self) -> RoleSummary {
        let roles = self.roles();
        RoleSummary {
            sbus_active_upstream: resolver::is_sbus_active_upstream(&roles),
            sbus_active: resolver::is_sbus_active(&roles),
            crsf_active: resolver::is_crsf_active(&roles),
            has_sbus_input: resolver::has_sbus_input(&roles),
            has_sbus_output: resolver::has_sbus_output(&roles),
            sbus_warning: resolver::show_sbus_warning(&roles),
        }
    }

    pub fn options(&self, slot: Slot) -> Vec<RoleOption> {
        resolver::available_options(slot, &self.roles(), self.board.caps())
    }

    /// Fields relevant to the current roles and WiFi mode.
    pub fn visible_fields(&self) -> Vec<TrackedField> {
        let s = &self.current;
        let roles = self.roles();
        let d2 = roles.get(Slot::D2);
        let d3 = roles.get(Slot::D3);
        let d4 = roles.get(Slot::D4);
        let d5 = roles.get(Slot::D5);
        let has_uart = roles.get(Slot::D1).is("0") || d2.is("1") || d3.is("0") || d3.is("1");
        let ap = s.wifi_mode == "0";
        let client = s.wifi_mode == "1";

        TrackedField::all()
            .filter(|field| {
                use TrackedField as F;
                match field {
                    F::Device5Role => self.board.has_device5(),
                    F::Baudrate | F::Databits | F::Parity | F::Stopbits | F::Flowcontrol => {
                        has_uart
                    }
                    F::Ssid | F::Device4SbusFormat => false,
                    F::Password | F::WifiApChannel => ap,
                    F::WifiNetwork0Ssid
                    | F::WifiNetwork0Pass
                    | F::WifiNetwork1Ssid
                    | F::WifiNetwork1Pass
                    | F::WifiNetwork2Ssid
                    | F::WifiNetwork2Pass
                    | F::WifiNetwork3Ssid
                    | F::WifiNetwork3Pass
                    | F::WifiNetwork4Ssid
                    | F::WifiNetwork4Pass => client,
                    F::MavlinkRouting => {
                        s.protocol_optimization == "1" && !resolver::is_sbus_active(&roles)
                    }
                    F::SbusTimingKeeper => d4.is("4"),
                    F::Device4TargetIp
                    | F::Device4TargetPort
                    | F::Device4UdpTimeout
                    | F::UdpBatching => !d4.is_disabled(),
                    F::Device4AutoBroadcast => client && (d4.has_base("1") || d4.has_base("3")),
                    F::Device2OutRate => d2.is("5") || d2.is("7"),
                    F::Device3OutRate => d3.has_base("5") && d3.format == "1",
                    F::Device4OutRate => (d4.has_base("3") && d4.format == "1") || d4.is("5"),
                    F::BtSendRate => d5.is("2") || d5.is("3"),
                    F::UsbMode => d2.is("2") && self.board.usb_host_supported,
                    _ => true,
                }
            })
            .collect()
    }

    // ── Submission ───────────────────────────────────────────────────

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&self.current)
    }

    /// `POST /save` body for the current settings.
    pub fn build_wire_request(&self) -> WireRequest {
        WireRequest::from_settings(&self.current)
    }
}

/// Split `KEY=VALUE` arguments and resolve their keys.
pub fn parse_assignments<S: AsRef<str>>(
    args: &[S],
) -> Result<Vec<(TrackedField, String)>, CoreError> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            let (key, value) = arg.split_once('=').ok_or_else(|| CoreError::InvalidValue {
                field: arg.to_owned(),
                reason: "expected KEY=VALUE".into(),
            })?;
            let field = key
                .trim()
                .parse::<TrackedField>()
                .map_err(|_| CoreError::UnknownField {
                    name: key.trim().to_owned(),
                })?;
            Ok((field, value.to_owned()))
        })
        .collect()
}

fn roles_of(s: &Settings) -> RoleSet {
    RoleSet::from_raw([
        s.device1_role.as_str(),
        s.device2_role.as_str(),
        s.device3_role.as_str(),
        s.device4_role.as_str(),
        s.device5_role.as_str(),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn loaded() -> ConfigState {
        ConfigState::from_device(&json!({
            "device1Role": 0,
            "device2Role": 2,
            "device3Role": 0,
            "device4Role": 1,
            "device4TargetIp": "192.168.4.2",
            "device4Port": 14550,
            "wifiMode": 0,
            "mdnsHostname": "uart-bridge",
            "protocolOptimization": 1,
            "btSupported": true
        }))
    }

    #[test]
    fn clean_after_load_and_snapshot() {
        let mut state = loaded();
        assert!(state.is_loaded());
        assert!(!state.is_dirty());

        state.set_field(TrackedField::Baudrate, "921600").unwrap();
        assert!(state.is_dirty());
        state.snapshot();
        assert!(!state.is_dirty());
    }

    #[test]
    fn not_dirty_before_load() {
        let mut state = ConfigState::default();
        state.set_field(TrackedField::Baudrate, "9600").unwrap();
        assert!(!state.is_dirty());
        assert!(state.dirty_fields().is_empty());
    }

    #[test]
    fn reset_restores_clean_state() {
        let mut state = loaded();
        state.set("device3Role", "5_1").unwrap();
        state.set("mdnsHostname", "other").unwrap();
        assert!(state.is_dirty());

        state.reset();
        assert!(!state.is_dirty());
        assert_eq!(state.current().device3_role, "0");
        assert_eq!(state.current().protocol_optimization, "1");
    }

    #[test]
    fn reverting_an_edit_is_clean() {
        let mut state = loaded();
        state.set("baudrate", "57600").unwrap();
        state.set("baudrate", "115200").unwrap();
        assert!(!state.is_dirty());
    }

    #[test]
    fn dirty_fields_report_both_sides() {
        let mut state = loaded();
        state.set("flowcontrol", "on").unwrap();
        assert_eq!(
            state.dirty_fields(),
            vec![FieldChange {
                field: TrackedField::Flowcontrol,
                from: FieldValue::Bool(false),
                to: FieldValue::Bool(true),
            }]
        );
    }

    #[test]
    fn role_edit_triggers_correction() {
        let mut state = loaded();
        let touched = state.set("device3Role", "5_1").unwrap();

        let s = state.current();
        assert_eq!(s.device1_role, "1");
        assert_eq!(s.device2_role, "0");
        assert_eq!(s.protocol_optimization, "2");
        assert!(touched.contains(&TrackedField::Device1Role));
        assert!(touched.contains(&TrackedField::Device2Role));
        assert!(touched.contains(&TrackedField::ProtocolOptimization));
        assert!(!touched.contains(&TrackedField::Device3Role));
    }

    #[test]
    fn protocol_edit_follows_roles() {
        let mut state = loaded();
        let touched = state.set("protocolOptimization", "2").unwrap();
        assert_eq!(state.current().protocol_optimization, "0");
        assert_eq!(touched, vec![TrackedField::ProtocolOptimization]);

        state.set("protocolOptimization", "1").unwrap();
        assert_eq!(state.current().protocol_optimization, "1");
    }

    #[test]
    fn protocol_mode_pinned_while_sbus_active() {
        let mut state = ConfigState::from_device(&json!({
            "device1Role": 1,
            "protocolOptimization": 2
        }));
        state.set("protocolOptimization", "0").unwrap();
        assert!(state.role_summary().sbus_active);
        assert_eq!(state.current().protocol_optimization, "2");
        assert!(!state.is_dirty());
        assert_eq!(
            state.build_wire_request().protocol_optimization,
            Some(2)
        );
    }

    #[test]
    fn slot4_base_change_resets_port_once() {
        let mut state = loaded();
        state.set("device1Role", "1").unwrap();

        state.set("device4Role", "3_0").unwrap();
        assert_eq!(state.current().device4_target_port, "14551");

        state.set("device4TargetPort", "15000").unwrap();
        state.set("device4Role", "3_1").unwrap();
        assert_eq!(state.current().device4_target_port, "15000");

        state.set("device4Role", "2").unwrap();
        assert_eq!(state.current().device4_target_port, "14560");
    }

    #[test]
    fn role_values_are_canonicalized_and_checked() {
        let mut state = loaded();
        state.set("device3Role", "5").unwrap();
        assert_eq!(state.current().device3_role, "5_0");

        let err = state.set("device3Role", "9").unwrap_err();
        assert!(matches!(err, CoreError::InvalidValue { .. }));

        let err = state.set("device9Role", "1").unwrap_err();
        assert!(matches!(err, CoreError::UnknownField { .. }));
    }

    #[test]
    fn bad_value_in_batch_changes_nothing() {
        let mut state = loaded();
        let err = state.set_fields(&[
            (TrackedField::Baudrate, "9600".into()),
            (TrackedField::UdpBatching, "maybe".into()),
        ]);
        assert!(err.is_err());
        assert!(!state.is_dirty());
    }

    #[test]
    fn batch_leaves_sbus_mode_cleanly() {
        let mut state = loaded();
        state.set("device3Role", "5_1").unwrap();
        assert_eq!(state.current().device1_role, "1");

        // Turning the receiver off alone is undone while an output remains.
        state.set("device1Role", "0").unwrap();
        assert_eq!(state.current().device1_role, "1");

        state
            .set_fields(&[
                (TrackedField::Device1Role, "0".into()),
                (TrackedField::Device3Role, "0".into()),
            ])
            .unwrap();
        assert_eq!(state.current().device1_role, "0");
        assert_eq!(state.current().protocol_optimization, "0");
    }

    #[test]
    fn slot5_requires_bluetooth() {
        let mut state = ConfigState::from_device(&json!({ "btSupported": false }));
        assert!(state.set("device5Role", "3").is_err());
        assert!(state.set("device5Role", "0").is_ok());
    }

    #[test]
    fn visibility_follows_roles() {
        let mut state = loaded();
        let visible = state.visible_fields();
        assert!(visible.contains(&TrackedField::Device4TargetIp));
        assert!(visible.contains(&TrackedField::UsbMode));
        assert!(!visible.contains(&TrackedField::WifiNetwork0Ssid));
        assert!(!visible.contains(&TrackedField::Device3OutRate));

        state.set("device3Role", "5_1").unwrap();
        assert!(state.visible_fields().contains(&TrackedField::Device3OutRate));
    }

    #[test]
    fn assignments_parse() {
        let edits = parse_assignments(&["baudrate=9600", "device4TargetIP=10.0.0.1,10.0.0.2"]).unwrap();
        assert_eq!(
            edits,
            vec![
                (TrackedField::Baudrate, "9600".to_owned()),
                (TrackedField::Device4TargetIp, "10.0.0.1,10.0.0.2".to_owned()),
            ]
        );
        assert!(matches!(
            parse_assignments(&["baudrate"]),
            Err(CoreError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_assignments(&["nope=1"]),
            Err(CoreError::UnknownField { .. })
        ));
    }

    #[test]
    fn wire_request_reflects_current() {
        let mut state = loaded();
        state.set("device3Role", "5_1").unwrap();
        let wire = state.build_wire_request();
        assert_eq!(wire.device1_role, Some(1));
        assert_eq!(wire.device3_role, Some(5));
        assert_eq!(wire.device3_sbus_format, Some(1));
        assert_eq!(wire.protocol_optimization, Some(2));
        assert!(state.is_dirty());
    }
}
