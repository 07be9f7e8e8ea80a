//! Configuration consistency engine and reboot reconnector for the UART
//! bridge firmware.
//!
//! - **[`ConfigState`]**: the editable settings against the last copy the
//!   device confirmed. Role edits run the auto-correction in
//!   [`resolver`] before returning, so the five device slots and the
//!   protocol mode never disagree. [`ConfigState::validate`] gates
//!   submission and [`ConfigState::build_wire_request`] produces the
//!   `POST /save` body.
//!
//! - **[`Reconnector`]**: the countdown / probe / retry state machine run
//!   after any operation that restarts the device, published through a
//!   `tokio::sync::watch` channel.
//!
//! - **[`Console`]**: session facade owning the client, the state, the
//!   pollers, and the hand-off to the reconnector.

pub mod config;
pub mod console;
pub mod convert;
pub mod error;
pub mod load;
pub mod model;
pub mod poller;
pub mod reconnect;
pub mod resolver;
pub mod role;
pub mod settings;
pub mod state;
pub mod validate;
pub mod wire;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::ConsoleConfig;
pub use console::{Console, SaveReport};
pub use error::CoreError;
pub use reconnect::{
    Phase, Probe, ProbeMode, RebootReason, ReconnectConfig, ReconnectState, Reconnector,
};
pub use resolver::{BoardCaps, RoleOption};
pub use role::{RoleSet, RoleValue, Slot};
pub use settings::{FieldValue, Settings, TrackedField};
pub use state::{ConfigState, FieldChange, RoleSummary, parse_assignments};
pub use validate::ValidationError;
pub use wire::WireRequest;

pub use bridgectl_api::RebootOutcome;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    BoardInfo, CrashRecord, RouterMode, RouterState, SbusSnapshot, SbusSourceInfo, SlotTraffic,
    StatusSnapshot, WifiLink,
};
