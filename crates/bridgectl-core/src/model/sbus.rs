use serde::Serialize;
use strum::Display;

/// Source selection policy of the SBUS router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum RouterMode {
    Auto,
    Manual,
}

/// Output health of the SBUS router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum RouterState {
    Ok,
    /// Last good frame is being repeated.
    Hold,
    Failsafe,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SbusSourceInfo {
    pub id: u8,
    pub name: String,
    pub configured: bool,
    /// Frame quality in percent.
    pub quality: u8,
    pub priority: u8,
    pub has_data: bool,
    pub valid: bool,
    pub has_failsafe: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SbusSnapshot {
    pub mode: RouterMode,
    pub state: RouterState,
    pub active_source: u8,
    pub sources: Vec<SbusSourceInfo>,
    pub frames_routed: u64,
    pub repeated_frames: u64,
}

impl SbusSnapshot {
    pub fn active(&self) -> Option<&SbusSourceInfo> {
        self.sources.iter().find(|s| s.id == self.active_source)
    }
}
