// ── Core error types ──
//
// User-facing errors from bridgectl-core. Consumers never see raw HTTP
// statuses or JSON parse failures: the `From<bridgectl_api::Error>` impl
// folds transport-layer errors into domain variants.

use thiserror::Error;

use crate::validate::ValidationError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Device request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Device did not come back after {rounds} reconnect rounds (tried {})", candidates.join(", "))]
    ReconnectExhausted {
        rounds: u32,
        candidates: Vec<String>,
    },

    #[error("Reconnect cancelled")]
    Cancelled,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown setting: {name}")]
    UnknownField { name: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Configuration not loaded from device")]
    NotLoaded,

    // ── Device errors ────────────────────────────────────────────────
    #[error("Device rejected the request: {message}")]
    Rejected { message: String },

    #[error("Device error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` when the device could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bridgectl_api::Error> for CoreError {
    fn from(err: bridgectl_api::Error) -> Self {
        match err {
            bridgectl_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() || e.is_request() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            bridgectl_api::Error::InvalidUrl(e) => CoreError::InvalidValue {
                field: "url".into(),
                reason: e.to_string(),
            },
            bridgectl_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            bridgectl_api::Error::ClientBuild(reason) => CoreError::Internal(reason),
            bridgectl_api::Error::Rejected { message } => CoreError::Rejected { message },
            bridgectl_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            bridgectl_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
