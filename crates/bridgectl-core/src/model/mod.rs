// ── Domain model ──
//
// Canonical representations of what the bridge reports. Raw API payloads
// are converted into these in `convert`, so CLI code never touches the
// firmware's field spellings.

pub mod board;
pub mod crash;
pub mod sbus;
pub mod status;

pub use board::BoardInfo;
pub use crash::CrashRecord;
pub use sbus::{RouterMode, RouterState, SbusSnapshot, SbusSourceInfo};
pub use status::{SlotTraffic, StatusSnapshot, WifiLink};
