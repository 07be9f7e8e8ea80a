// bridgectl-api: Async Rust client for the UART bridge firmware's web API

pub mod client;
pub mod config;
pub mod error;
pub mod firmware;
pub mod logs;
pub mod models;
pub mod sbus;
pub mod status;
pub mod transport;

pub use client::BridgeClient;
pub use error::Error;
pub use models::{Ack, CrashEntry, CrashLog, DeviceStatus, RebootOutcome, SbusSource, SbusStatus};
pub use sbus::SbusMode;
pub use transport::TransportConfig;
