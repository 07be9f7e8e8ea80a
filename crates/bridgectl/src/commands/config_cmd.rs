//! Config subcommand handlers.

use dialoguer::Input;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: "must be a whole number".into(),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "device" => {
            config::parse_device_url(&value)?;
            profile.device = value;
        }
        "alternate" => {
            if value.is_empty() {
                profile.alternate = None;
            } else {
                config::parse_device_url(&value)?;
                profile.alternate = Some(value);
            }
        }
        "timeout" => profile.timeout = Some(parse_number(key, &value)?),
        "save_wait_secs" | "save-wait-secs" => {
            profile.save_wait_secs = Some(parse_number(key, &value)?);
        }
        "firmware_wait_secs" | "firmware-wait-secs" => {
            profile.firmware_wait_secs = Some(parse_number(key, &value)?);
        }
        "max_rounds" | "max-rounds" => profile.max_rounds = Some(parse_number(key, &value)?),
        "probe_timeout_secs" | "probe-timeout-secs" => {
            profile.probe_timeout_secs = Some(parse_number(key, &value)?);
        }
        "poll_interval_secs" | "poll-interval-secs" => {
            profile.poll_interval_secs = Some(parse_number(key, &value)?);
        }
        "sync_time" | "sync-time" => {
            profile.sync_time = Some(value.parse().map_err(|_| CliError::Validation {
                field: "sync_time".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: device, alternate, timeout, \
                     save_wait_secs, firmware_wait_secs, max_rounds, probe_timeout_secs, \
                     poll_interval_secs, sync_time"
                ),
            });
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct ProfileView {
    name: String,
    device: String,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: String,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Device")]
    device: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("bridgectl configuration");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let device: String = Input::new()
                .with_prompt("Device address")
                .default("192.168.4.1".into())
                .validate_with(|input: &String| {
                    config::parse_device_url(input)
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let alternate: String = Input::new()
                .with_prompt("Address after a restart, if different (blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;

            let mut profile = Profile {
                device,
                ..Profile::default()
            };
            set_profile_key(&mut profile, "alternate", alternate)?;

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: bridgectl status");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c: &Config| toml::to_string_pretty(c).unwrap_or_default(),
                |c: &Config| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            set_profile_key(profile, &key, value)?;
            if profile.device.is_empty() {
                return Err(CliError::Validation {
                    field: "device".into(),
                    reason: format!(
                        "profile '{profile_name}' has no device yet; set it first with: \
                         bridgectl config set device ADDRESS"
                    ),
                });
            }

            let path = config::save_config(&cfg)?;
            output::notice(
                &format!("✓ Set {key} on profile '{profile_name}' ({})", path.display()),
                global.quiet,
            );
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            let list: Vec<ProfileView> = cfg
                .profiles
                .iter()
                .map(|(name, p)| ProfileView {
                    name: name.clone(),
                    device: p.device.clone(),
                    default: name == default,
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &list,
                |p| ProfileRow {
                    marker: if p.default { "*".into() } else { String::new() },
                    name: p.name.clone(),
                    device: p.device.clone(),
                },
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Use <name> ──────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            cfg.profile(Some(&name))?;
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
