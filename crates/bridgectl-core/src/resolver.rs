// ── Role resolver ──
//
// Pure derivations over a role selection: which protocol family is active,
// which roles must be corrected to keep the slots consistent, which options
// each slot may offer, and the default UDP port for slot 4.

use serde::Serialize;

use crate::role::{RoleSet, RoleValue, Slot};

/// Hardware capabilities that influence which roles are selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoardCaps {
    pub uart2_available: bool,
    pub bt_supported: bool,
    pub ble_supported: bool,
}

impl Default for BoardCaps {
    fn default() -> Self {
        Self {
            uart2_available: true,
            bt_supported: false,
            ble_supported: false,
        }
    }
}

// ── Protocol modes ──────────────────────────────────────────────────

/// `protocolOptimization` value with no protocol-aware framing.
pub const PROTOCOL_NONE: &str = "0";
/// SBUS framing; only ever selected automatically.
pub const PROTOCOL_SBUS: &str = "2";
/// CRSF framing; only ever selected automatically.
pub const PROTOCOL_CRSF: &str = "3";

// ── Predicates ──────────────────────────────────────────────────────

/// SBUS in use on slots 1–3. Slot 4/5 options depend on this.
pub fn is_sbus_active_upstream(roles: &RoleSet) -> bool {
    let d2 = roles.get(Slot::D2);
    let d3 = roles.get(Slot::D3);
    roles.get(Slot::D1).is("1")
        || d2.is("3")
        || d2.is("4")
        || d2.is("5")
        || d3.is("4")
        || d3.has_base("5")
}

/// SBUS in use on any slot.
pub fn is_sbus_active(roles: &RoleSet) -> bool {
    let d4 = roles.get(Slot::D4);
    is_sbus_active_upstream(roles) || d4.has_base("3") || d4.is("4") || roles.get(Slot::D5).is("2")
}

/// CRSF receiver on slot 1.
pub fn is_crsf_active(roles: &RoleSet) -> bool {
    roles.get(Slot::D1).is("2")
}

pub fn has_sbus_input(roles: &RoleSet) -> bool {
    roles.get(Slot::D1).is("1")
        || roles.get(Slot::D2).is("3")
        || roles.get(Slot::D3).is("4")
        || roles.get(Slot::D4).is("4")
}

pub fn has_sbus_output(roles: &RoleSet) -> bool {
    let d2 = roles.get(Slot::D2);
    d2.is("4")
        || d2.is("5")
        || roles.get(Slot::D3).has_base("5")
        || roles.get(Slot::D4).has_base("3")
        || roles.get(Slot::D5).is("2")
}

/// An SBUS output is configured with nothing feeding it.
pub fn show_sbus_warning(roles: &RoleSet) -> bool {
    has_sbus_output(roles) && !has_sbus_input(roles)
}

/// Whether slot `slot` holds any SBUS-tagged role (input or output).
fn holds_sbus_role(roles: &RoleSet, slot: Slot) -> bool {
    let role = roles.get(slot);
    match slot {
        Slot::D1 => role.is("1"),
        Slot::D2 => role.is("3") || role.is("4") || role.is("5"),
        Slot::D3 => role.is("4") || role.has_base("5"),
        Slot::D4 => role.has_base("3") || role.is("4"),
        Slot::D5 => role.is("2"),
    }
}

/// Whether slot `slot` holds an SBUS output role.
fn holds_sbus_output(roles: &RoleSet, slot: Slot) -> bool {
    let role = roles.get(slot);
    match slot {
        Slot::D1 => false,
        Slot::D2 => role.is("4") || role.is("5"),
        Slot::D3 => role.has_base("5"),
        Slot::D4 => role.has_base("3"),
        Slot::D5 => role.is("2"),
    }
}

// ── Auto-correction ─────────────────────────────────────────────────

/// Bring `roles` and `protocol` back to a consistent combination.
///
/// Run synchronously after every batch of role edits. Idempotent: a second
/// pass over its own output changes nothing.
pub fn auto_correct(roles: &mut RoleSet, protocol: &mut String) {
    // Any SBUS role downstream needs slot 1 as the SBUS receiver.
    if [Slot::D2, Slot::D3, Slot::D4, Slot::D5]
        .into_iter()
        .any(|slot| holds_sbus_role(roles, slot))
    {
        roles.set(Slot::D1, RoleValue::decode("1"));
    }

    if !is_sbus_active_upstream(roles) {
        for slot in [Slot::D4, Slot::D5] {
            if holds_sbus_role(roles, slot) {
                roles.set(slot, RoleValue::disabled());
            }
        }
    }

    if !has_sbus_input(roles) {
        for slot in [Slot::D2, Slot::D3, Slot::D4, Slot::D5] {
            if holds_sbus_output(roles, slot) {
                roles.set(slot, RoleValue::disabled());
            }
        }
    }

    // Slot 1 in an input mode leaves no telemetry path for plain bridging.
    if roles.get(Slot::D1).is("1") || roles.get(Slot::D1).is("2") {
        for slot in [Slot::D2, Slot::D3] {
            let role = roles.get(slot);
            if role.is("1") || role.is("2") {
                roles.set(slot, RoleValue::disabled());
            }
        }
    }

    if is_crsf_active(roles) {
        PROTOCOL_CRSF.clone_into(protocol);
    } else if is_sbus_active(roles) {
        PROTOCOL_SBUS.clone_into(protocol);
    } else if protocol == PROTOCOL_SBUS || protocol == PROTOCOL_CRSF {
        PROTOCOL_NONE.clone_into(protocol);
    }
}

// ── Available options ───────────────────────────────────────────────

/// One selectable role for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleOption {
    pub value: &'static str,
    pub label: &'static str,
    pub disabled: bool,
}

const fn opt(value: &'static str, label: &'static str, disabled: bool) -> RoleOption {
    RoleOption {
        value,
        label,
        disabled,
    }
}

/// Options `slot` offers under the current selection.
pub fn available_options(slot: Slot, roles: &RoleSet, caps: BoardCaps) -> Vec<RoleOption> {
    let crsf = is_crsf_active(roles);
    let sbus = is_sbus_active(roles);
    let no_sbus_in = !has_sbus_input(roles);
    let uart2 = caps.uart2_available;
    let d1 = roles.get(Slot::D1);
    let d1_input = d1.is("1") || crsf;

    match slot {
        Slot::D1 => vec![
            opt("0", "UART", false),
            opt("1", "SBUS Input", false),
            opt("2", "CRSF Input", false),
        ],
        Slot::D2 => vec![
            opt("0", "Disabled", false),
            opt("1", "UART2", !uart2 || d1_input),
            opt("2", "USB", d1_input),
            opt("6", "USB Logger", false),
            opt("3", "SBUS Input", !uart2 || crsf),
            opt("4", "SBUS Output", !uart2 || crsf || no_sbus_in),
            opt("5", "USB SBUS Text Output", crsf || no_sbus_in),
            opt("7", "USB CRSF Text Output", !crsf),
            opt("8", "USB CRSF Bridge", !crsf),
        ],
        Slot::D3 => {
            let d1_sbus_or_crsf = d1.is("1") || d1.is("2");
            vec![
                opt("0", "Disabled", false),
                opt("1", "UART3 Mirror", d1_sbus_or_crsf),
                opt("2", "UART3 Bridge", d1_sbus_or_crsf),
                opt("3", "UART3 Logger", false),
                opt("4", "SBUS Input", crsf),
                opt("5_0", "SBUS Output", crsf || no_sbus_in),
                opt("5_1", "SBUS Text Output", crsf || no_sbus_in),
                opt("6", "CRSF Bridge", !crsf),
            ]
        }
        Slot::D4 if is_sbus_active_upstream(roles) => vec![
            opt("0", "Disabled", false),
            opt("2", "UDP Logger", false),
            opt("3_0", "SBUS Output", no_sbus_in),
            opt("3_1", "SBUS Text Output", no_sbus_in),
            opt("4", "SBUS Input", no_sbus_in),
        ],
        Slot::D4 => vec![
            opt("0", "Disabled", false),
            opt("1", "Network Bridge", crsf),
            opt("2", "UDP Logger", false),
            opt("5", "CRSF Text Output", !crsf),
        ],
        Slot::D5 => vec![
            opt("0", "Disabled", false),
            opt("1", "Bridge", sbus || crsf),
            opt("2", "SBUS Text Output", no_sbus_in),
            opt("3", "CRSF Text Output", !crsf),
        ],
    }
}

/// Every role value `slot` can ever hold, whatever the other slots select.
pub fn known_values(slot: Slot) -> &'static [&'static str] {
    match slot {
        Slot::D1 => &["0", "1", "2"],
        Slot::D2 => &["0", "1", "2", "3", "4", "5", "6", "7", "8"],
        Slot::D3 => &["0", "1", "2", "3", "4", "5_0", "5_1", "6"],
        Slot::D4 => &["0", "1", "2", "3_0", "3_1", "4", "5"],
        Slot::D5 => &["0", "1", "2", "3"],
    }
}

// ── Port defaults ───────────────────────────────────────────────────

/// Default slot 4 UDP port after a role change, or `None` to keep the
/// current port. Only a change of base counts; a format-only change keeps
/// a user-edited port.
pub fn port_default(old: &RoleValue, new: &RoleValue) -> Option<&'static str> {
    if old.base == new.base {
        return None;
    }
    match new.base.as_str() {
        "1" => Some("14550"),
        "2" => Some("14560"),
        "3" => Some("14551"),
        "4" => Some("14552"),
        _ => None,
    }
}
