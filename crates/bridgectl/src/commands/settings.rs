//! Settings command handlers: show, set (save + reconnect), validate.

use serde::Serialize;
use tabled::Tabled;

use bridgectl_core::{
    ConfigState, Console, FieldValue, RebootReason, TrackedField, parse_assignments,
};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Views ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SettingView {
    key: TrackedField,
    value: String,
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Serialize)]
struct ChangeView {
    field: TrackedField,
    from: String,
    to: String,
    /// Changed by role auto-correction rather than by the user.
    automatic: bool,
}

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Setting")]
    field: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "")]
    note: String,
}

/// Display form of a value; secrets are masked.
fn shown(field: TrackedField, value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) if field.is_secret() && !s.is_empty() => "****".into(),
        FieldValue::Text(s) if s.is_empty() => "-".into(),
        other => other.to_string(),
    }
}

fn changes(state: &ConfigState, automatic: &[TrackedField]) -> Vec<ChangeView> {
    state
        .dirty_fields()
        .into_iter()
        .map(|c| ChangeView {
            field: c.field,
            from: shown(c.field, &c.from),
            to: shown(c.field, &c.to),
            automatic: automatic.contains(&c.field),
        })
        .collect()
}

fn render_changes(list: &[ChangeView], global: &GlobalOpts) -> Result<String, CliError> {
    let paint = Painter::new(&global.color);
    output::render_list(
        &global.output,
        list,
        |c| ChangeRow {
            field: c.field.to_string(),
            from: paint.dim(&c.from),
            to: c.to.clone(),
            note: if c.automatic {
                paint.warn("auto")
            } else {
                String::new()
            },
        },
        |c| format!("{}={}", c.field, c.to),
    )
}

/// Load from the device, apply `assignments`, and print the resulting
/// changes. Returns the state after the edits.
async fn apply(
    console: &Console,
    assignments: &[String],
    global: &GlobalOpts,
) -> Result<Option<ConfigState>, CliError> {
    console.connect().await?;
    let edits = parse_assignments(assignments)?;
    let automatic = console.set_fields(&edits).await?;

    let state = console.state().await;
    let list = changes(&state, &automatic);
    if list.is_empty() {
        output::notice("No changes", global.quiet);
        return Ok(None);
    }
    output::print_output(&render_changes(&list, global)?, global.quiet);
    Ok(Some(state))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show { all } => {
            console.connect().await?;
            let state = console.state().await;
            let fields: Vec<TrackedField> = if all {
                TrackedField::all().collect()
            } else {
                state.visible_fields()
            };
            let list: Vec<SettingView> = fields
                .into_iter()
                .map(|key| SettingView {
                    key,
                    value: shown(key, &state.current().get(key)),
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &list,
                |s| SettingRow {
                    key: s.key.to_string(),
                    value: s.value.clone(),
                },
                |s| format!("{}={}", s.key, s.value),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Validate { assignments } => {
            let paint = Painter::new(&global.color);
            let state = match apply(console, &assignments, global).await? {
                Some(state) => state,
                None => console.state().await,
            };
            state.validate().map_err(|e| CliError::InvalidSettings {
                message: e.to_string(),
            })?;
            output::notice(
                &format!("{} Configuration is valid", paint.good("✓")),
                global.quiet,
            );
            Ok(())
        }

        SettingsCommand::Set {
            assignments,
            dry_run,
            reboot,
        } => {
            let Some(state) = apply(console, &assignments, global).await? else {
                return Ok(());
            };
            state.validate().map_err(|e| CliError::InvalidSettings {
                message: e.to_string(),
            })?;
            if dry_run {
                return Ok(());
            }

            let count = state.dirty_fields().len();
            let prompt = format!("Save {count} change(s) and restart the device?");
            if !util::confirm(&prompt, global.yes)? {
                console.discard_edits().await;
                output::notice("Aborted, nothing was saved", global.quiet);
                return Ok(());
            }

            let report = console.save().await?;
            if let Some(ref alt) = report.alternate {
                output::notice(&format!("Device name changed, expecting it at {alt}"), global.quiet);
            }
            util::after_reboot(
                console,
                &report.outcome,
                RebootReason::Save,
                report.alternate,
                &reboot,
                global,
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_masked() {
        let value = FieldValue::Text("hunter22".into());
        assert_eq!(shown(TrackedField::Password, &value), "****");
        assert_eq!(shown(TrackedField::Ssid, &value), "hunter22");
        assert_eq!(shown(TrackedField::Password, &FieldValue::Text(String::new())), "-");
        assert_eq!(shown(TrackedField::UdpBatching, &FieldValue::Bool(true)), "true");
    }
}
