use chrono::{DateTime, Utc};
use serde::Serialize;

/// One abnormal reset recorded by the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrashRecord {
    pub number: u64,
    pub reason: String,
    pub uptime_secs: u64,
    pub heap: u64,
    pub min_heap: u64,
    /// `None` when the device clock was never synced before the crash.
    pub at: Option<DateTime<Utc>>,
    pub version: Option<String>,
    /// Panic details (PC, task, backtrace), passed through as reported.
    pub panic: Option<serde_json::Value>,
}
