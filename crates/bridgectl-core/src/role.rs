// ── Role codec ──
//
// Device roles travel as strings. Slots 3 and 4 carry composite roles
// (`"<base>_<format>"`) where the base selects the function and the format
// selects binary vs. text framing. Everything else is a bare base.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// One of the five configurable device slots.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Slot {
    #[strum(to_string = "Device 1")]
    D1,
    #[strum(to_string = "Device 2")]
    D2,
    #[strum(to_string = "Device 3")]
    D3,
    #[strum(to_string = "Device 4")]
    D4,
    #[strum(to_string = "Device 5")]
    D5,
}

impl Slot {
    /// Zero-based position in a [`RoleSet`].
    pub fn index(self) -> usize {
        match self {
            Self::D1 => 0,
            Self::D2 => 1,
            Self::D3 => 2,
            Self::D4 => 3,
            Self::D5 => 4,
        }
    }

    /// 1-based slot number as printed on the board.
    pub fn number(self) -> u8 {
        match self {
            Self::D1 => 1,
            Self::D2 => 2,
            Self::D3 => 3,
            Self::D4 => 4,
            Self::D5 => 5,
        }
    }

    /// Whether `base` is a composite role in this slot (format always explicit).
    pub fn is_composite(self, base: &str) -> bool {
        matches!((self, base), (Self::D3, "5") | (Self::D4, "3"))
    }
}

/// A decoded role: function plus output format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleValue {
    pub base: String,
    pub format: String,
}

impl Default for RoleValue {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RoleValue {
    /// The `"0"` role every slot starts with.
    pub fn disabled() -> Self {
        Self {
            base: "0".into(),
            format: "0".into(),
        }
    }

    /// Split a raw role string on its first `_`. Never fails.
    pub fn decode(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::disabled();
        }
        match raw.split_once('_') {
            Some((base, format)) => Self {
                base: if base.is_empty() { "0" } else { base }.to_owned(),
                format: if format.is_empty() { "0" } else { format }.to_owned(),
            },
            None => Self {
                base: raw.to_owned(),
                format: "0".into(),
            },
        }
    }

    /// Encode for `slot`: bare base when the format is the implicit default,
    /// `base_format` otherwise.
    pub fn encode(&self, slot: Slot) -> String {
        if !slot.is_composite(&self.base) && self.format == "0" {
            self.base.clone()
        } else {
            format!("{}_{}", self.base, self.format)
        }
    }

    /// True for a plain role equal to `value` (format `"0"`).
    pub fn is(&self, value: &str) -> bool {
        self.base == value && self.format == "0"
    }

    pub fn has_base(&self, base: &str) -> bool {
        self.base == base
    }

    pub fn is_disabled(&self) -> bool {
        self.base == "0"
    }
}

impl fmt::Display for RoleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format == "0" {
            f.write_str(&self.base)
        } else {
            write!(f, "{}_{}", self.base, self.format)
        }
    }
}

/// Canonical string form of a raw role for `slot` (`"5"` in slot 3 becomes `"5_0"`).
pub fn canonicalize(slot: Slot, raw: &str) -> String {
    RoleValue::decode(raw).encode(slot)
}

/// The five slot roles, decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet([RoleValue; 5]);

impl RoleSet {
    /// Decode five raw role strings, slot 1 first.
    pub fn from_raw(raw: [&str; 5]) -> Self {
        Self(raw.map(RoleValue::decode))
    }

    pub fn get(&self, slot: Slot) -> &RoleValue {
        &self.0[slot.index()]
    }

    pub fn set(&mut self, slot: Slot, value: RoleValue) {
        self.0[slot.index()] = value;
    }

    /// Encoded role string for `slot`.
    pub fn encoded(&self, slot: Slot) -> String {
        self.get(slot).encode(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &RoleValue)> {
        Slot::iter().map(move |slot| (slot, self.get(slot)))
    }
}
