//! CLI configuration -- thin wrapper around `bridgectl_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--device, --profile, --timeout).

use std::time::Duration;

use bridgectl_config::ConfigError;
use bridgectl_core::ConsoleConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use bridgectl_config::{
    Config, Profile, config_path, load_config_or_default, parse_device_url, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ConsoleConfig` from the config file, profile, and CLI overrides.
///
/// An explicit `--profile` must exist. Without one, a missing default
/// profile is fine as long as `--device` names the bridge.
pub fn resolve_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut console = match cfg.profiles.get(&profile_name) {
        Some(profile) => bridgectl_config::profile_to_console_config(profile, &cfg.defaults)?,
        None if global.profile.is_some() => {
            return Err(ConfigError::UnknownProfile { name: profile_name }.into());
        }
        None => {
            let raw = global.device.as_deref().ok_or_else(|| CliError::NoConfig {
                path: config_path().display().to_string(),
            })?;
            let mut console = ConsoleConfig::new(parse_device_url(raw)?);
            console.timeout = Duration::from_secs(cfg.defaults.timeout);
            console
        }
    };

    // Flags win over the profile.
    if let Some(ref device) = global.device {
        console.url = parse_device_url(device)?;
    }
    if let Some(secs) = global.timeout {
        console.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(profile = %profile_name, url = %console.url, "resolved device");
    Ok(console)
}
