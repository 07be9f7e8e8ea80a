//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bridgectl_config::ConfigError;
use bridgectl_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the bridge at {url}")]
    #[diagnostic(
        code(bridgectl::connection_failed),
        help(
            "Check that your computer is on the bridge's WiFi (AP mode: 192.168.4.1)\n\
             or on the same network in client mode.\n\
             Try: bridgectl --device 192.168.4.1 status"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("The bridge did not come back after {rounds} reconnect rounds")]
    #[diagnostic(
        code(bridgectl::reconnect_exhausted),
        help(
            "Tried: {tried}\n\
             Reconnect to the bridge's network, then run: bridgectl wait"
        )
    )]
    ReconnectExhausted { rounds: u32, tried: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(bridgectl::timeout),
        help("Increase timeout with --timeout or check that the bridge is responsive.")
    )]
    Timeout { seconds: u64 },

    #[error("Interrupted")]
    #[diagnostic(code(bridgectl::interrupted))]
    Interrupted,

    // ── Device ───────────────────────────────────────────────────────
    #[error("The bridge rejected the request: {message}")]
    #[diagnostic(code(bridgectl::rejected))]
    Rejected { message: String },

    #[error("Device error ({code}): {message}")]
    #[diagnostic(code(bridgectl::device_error))]
    DeviceError { code: String, message: String },

    // ── Settings ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(bridgectl::invalid_settings),
        help("Nothing was sent to the device. Check the values with: bridgectl settings validate KEY=VALUE")
    )]
    InvalidSettings { message: String },

    #[error("Unknown setting '{name}'")]
    #[diagnostic(
        code(bridgectl::unknown_setting),
        help("Run: bridgectl settings show --all to list setting names")
    )]
    UnknownSetting { name: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bridgectl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bridgectl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: bridgectl config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No device configured")]
    #[diagnostic(
        code(bridgectl::no_config),
        help(
            "Pass --device (or set BRIDGECTL_DEVICE), or create a profile with: bridgectl config init\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(bridgectl::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(bridgectl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(bridgectl::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(bridgectl::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ReconnectExhausted { .. } => {
                exit_code::CONNECTION
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::InvalidSettings { .. }
            | Self::UnknownSetting { .. }
            | Self::NoConfig { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::ReconnectExhausted { rounds, candidates } => CliError::ReconnectExhausted {
                rounds,
                tried: candidates.join(", "),
            },

            CoreError::Cancelled => CliError::Interrupted,

            CoreError::Validation(e) => CliError::InvalidSettings {
                message: e.to_string(),
            },

            CoreError::UnknownField { name } => CliError::UnknownSetting { name },

            CoreError::InvalidValue { field, reason } => CliError::Validation { field, reason },

            CoreError::NotLoaded => CliError::DeviceError {
                code: "not_loaded".into(),
                message: "configuration has not been read from the device".into(),
            },

            CoreError::Rejected { message } => CliError::Rejected { message },

            CoreError::Api { message, status } => CliError::DeviceError {
                code: status.map_or_else(|| "unknown".into(), |s| s.to_string()),
                message,
            },

            CoreError::Internal(message) => CliError::DeviceError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => {
                let available = bridgectl_config::load_config_or_default()
                    .profiles
                    .into_keys()
                    .collect::<Vec<_>>()
                    .join(", ");
                CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available
                    },
                }
            }
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use bridgectl_core::ValidationError;

    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let unreachable: CliError = CoreError::ReconnectExhausted {
            rounds: 3,
            candidates: vec!["http://192.168.4.1/".into()],
        }
        .into();
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let invalid: CliError = CoreError::Validation(ValidationError::PrimarySsidRequired).into();
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
        assert_eq!(invalid.to_string(), "Primary SSID required");

        let rejected: CliError = CoreError::Rejected {
            message: "Invalid baudrate".into(),
        }
        .into();
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);

        let timeout: CliError = CoreError::Timeout { timeout_secs: 5 }.into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn exhausted_help_lists_candidates() {
        let err: CliError = CoreError::ReconnectExhausted {
            rounds: 2,
            candidates: vec![
                "http://new-name.local/".into(),
                "http://192.168.4.1/".into(),
            ],
        }
        .into();
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("http://new-name.local/, http://192.168.4.1/"));
    }
}
