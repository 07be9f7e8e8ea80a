//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use url::Url;

use bridgectl_core::{
    Console, Phase, Probe, RebootOutcome, RebootReason, ReconnectState, Reconnector,
};

use crate::cli::{GlobalOpts, RebootOpts};
use crate::error::CliError;
use crate::output::{self, Painter};

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Read a file for upload, keeping its name for the multipart part.
pub fn read_upload(path: &Path) -> Result<(Vec<u8>, String), CliError> {
    let contents = std::fs::read(path)?;
    let name = path
        .file_name()
        .map_or_else(|| "upload.bin".into(), |n| n.to_string_lossy().into_owned());
    Ok((contents, name))
}

/// Unix seconds or RFC3339.
pub fn parse_time(value: &str, field: &str) -> Result<i64, CliError> {
    if let Ok(ts) = value.parse::<i64>() {
        return Ok(ts);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).timestamp())
        .map_err(|_| CliError::Validation {
            field: field.into(),
            reason: format!("invalid timestamp '{value}' (use Unix seconds or RFC3339)"),
        })
}

// ── Restart hand-off ────────────────────────────────────────────────

/// Report how the device answered a restarting request, then follow it
/// through the restart unless `--no-wait` was given.
pub async fn after_reboot(
    console: &Console,
    outcome: &RebootOutcome,
    reason: RebootReason,
    alternate: Option<Url>,
    opts: &RebootOpts,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let paint = Painter::new(&global.color);
    match outcome {
        RebootOutcome::Unchanged { message } => {
            output::notice(message, global.quiet);
            return Ok(());
        }
        RebootOutcome::Accepted { message } => output::notice(message, global.quiet),
        RebootOutcome::Rebooting => {
            output::notice(&format!("Device restarting after {reason}"), global.quiet);
        }
    }

    if opts.no_wait {
        return Ok(());
    }
    let url = wait_for_device(console.reconnector(reason, alternate), global).await?;
    output::notice(
        &format!("{} Device is back at {url}", paint.good("✓")),
        global.quiet,
    );
    Ok(())
}

/// Run a reconnector with a spinner fed from its state channel. Ctrl-C
/// abandons the wait.
pub async fn wait_for_device<P: Probe>(
    reconnector: Reconnector<P>,
    global: &GlobalOpts,
) -> Result<Url, CliError> {
    let pb = spinner(global.quiet);
    let progress = tokio::spawn(drive_spinner(reconnector.subscribe(), pb.clone()));

    let result = tokio::select! {
        r = reconnector.run() => r.map_err(CliError::from),
        _ = tokio::signal::ctrl_c() => Err(CliError::Interrupted),
    };

    progress.abort();
    pb.finish_and_clear();
    result
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

async fn drive_spinner(mut rx: watch::Receiver<ReconnectState>, pb: ProgressBar) {
    loop {
        let state = rx.borrow_and_update().clone();
        pb.set_message(describe(&state));
        if state.is_finished() || rx.changed().await.is_err() {
            break;
        }
    }
}

/// One-line description of a reconnect state.
pub fn describe(state: &ReconnectState) -> String {
    let attempt = format!("{} ({}/{})", state.label(), state.round, state.max_rounds);
    match &state.phase {
        Phase::Counting => format!(
            "{attempt}: checking in {}s",
            state.countdown_remaining
        ),
        Phase::Probing => {
            let hosts = state
                .candidates
                .iter()
                .filter_map(Url::host_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{attempt}: probing {hosts}")
        }
        Phase::Succeeded(url) => format!("Back online at {url}"),
        Phase::Exhausted => "Device did not come back".into(),
        Phase::Cancelled => "Cancelled".into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn state(round: u32, phase: Phase) -> ReconnectState {
        ReconnectState {
            round,
            max_rounds: 3,
            countdown_remaining: 5,
            candidates: vec![
                Url::parse("http://uart-bridge.local/").unwrap(),
                Url::parse("http://192.168.4.1/").unwrap(),
            ],
            phase,
        }
    }

    #[test]
    fn describes_each_phase() {
        assert_eq!(
            describe(&state(1, Phase::Counting)),
            "Rebooting (1/3): checking in 5s"
        );
        assert_eq!(
            describe(&state(2, Phase::Probing)),
            "Retrying (2/3): probing uart-bridge.local, 192.168.4.1"
        );
        assert_eq!(describe(&state(3, Phase::Exhausted)), "Device did not come back");
    }

    #[test]
    fn parses_unix_and_rfc3339() {
        assert_eq!(parse_time("1700000000", "at").unwrap(), 1_700_000_000);
        assert_eq!(
            parse_time("2023-11-14T22:13:20Z", "at").unwrap(),
            1_700_000_000
        );
        assert!(parse_time("yesterday", "at").is_err());
    }
}
