use thiserror::Error;

/// Top-level error type for the `bridgectl-api` crate.
///
/// Covers every failure mode of the bridge's HTTP surface: transport,
/// device-side rejections, and payload decoding. `bridgectl-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, reset, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Device ──────────────────────────────────────────────────────
    /// The device answered `{"status": "error", "message": ...}`.
    #[error("Device rejected the request: {message}")]
    Rejected { message: String },

    /// Non-success HTTP status, with the device message when it sent one.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the connection dropped after the request reached
    /// the device: reset mid-request or cut mid-body. A refused connection
    /// or a timeout never delivered the request and is not a reboot.
    pub fn is_reboot_signal(&self) -> bool {
        match self {
            Self::Transport(e) => {
                !e.is_connect() && !e.is_timeout() && (e.is_request() || e.is_body())
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The device-provided message, if the device sent one.
    pub fn device_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } | Self::Http { message, .. } => Some(message),
            _ => None,
        }
    }
}
