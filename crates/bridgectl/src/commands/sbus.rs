//! SBUS router command handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use bridgectl_core::{Console, RouterMode, RouterState, SbusSnapshot, SbusSourceInfo};

use crate::cli::{GlobalOpts, SbusArgs, SbusCommand, SbusModeArg};
use crate::error::CliError;
use crate::output::{self, Painter};

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "")]
    active: String,
    #[tabled(rename = "ID")]
    id: u8,
    #[tabled(rename = "Source")]
    name: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Priority")]
    priority: u8,
    #[tabled(rename = "Signal")]
    signal: String,
}

fn signal(s: &SbusSourceInfo) -> &'static str {
    match (s.configured, s.has_data, s.valid, s.has_failsafe) {
        (false, ..) => "not configured",
        (true, false, ..) => "no data",
        (true, true, _, true) => "failsafe",
        (true, true, false, false) => "invalid",
        (true, true, true, false) => "ok",
    }
}

fn detail(snap: &SbusSnapshot, paint: Painter) -> String {
    let state = match snap.state {
        RouterState::Ok => paint.good("OK"),
        RouterState::Hold => paint.warn("HOLD"),
        RouterState::Failsafe => paint.bad("FAILSAFE"),
        RouterState::Unknown => paint.dim("unknown"),
    };
    let rows: Vec<SourceRow> = snap
        .sources
        .iter()
        .map(|s| SourceRow {
            active: if s.id == snap.active_source { "*".into() } else { String::new() },
            id: s.id,
            name: s.name.clone(),
            quality: format!("{}%", s.quality),
            priority: s.priority,
            signal: signal(s).into(),
        })
        .collect();

    let mut out = format!(
        "Mode:   {}\nState:  {state}\nFrames: {} routed, {} repeated",
        snap.mode, snap.frames_routed, snap.repeated_frames
    );
    if !rows.is_empty() {
        let _ = write!(out, "\n\n{}", output::render_table(&rows));
    }
    out
}

fn render(snap: &SbusSnapshot, global: &GlobalOpts) -> Result<String, CliError> {
    let paint = Painter::new(&global.color);
    output::render_single(
        &global.output,
        snap,
        |s| detail(s, paint),
        |s| s.active().map_or_else(|| "none".into(), |a| a.name.clone()),
    )
}

pub async fn handle(console: &Console, args: SbusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SbusCommand::Status(watch) if !watch.watch => {
            let snap = console.sbus_status().await?;
            output::print_output(&render(&snap, global)?, global.quiet);
            Ok(())
        }

        SbusCommand::Status(_) => {
            // The router poller only runs while the roles use SBUS.
            console.connect().await?;
            if !console.sync_sbus_poller().await {
                output::notice("SBUS is not active in the current roles", global.quiet);
                return Ok(());
            }
            let mut rx = console.sbus_updates().await;
            loop {
                tokio::select! {
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let latest = rx.borrow_and_update().clone();
                        if let Some(snap) = latest {
                            output::print_output(&render(&snap, global)?, global.quiet);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
            Ok(())
        }

        SbusCommand::Source { source } => {
            console.set_sbus_source(source).await?;
            output::notice(&format!("SBUS source set to {source}"), global.quiet);
            Ok(())
        }

        SbusCommand::Mode { mode } => {
            let mode = match mode {
                SbusModeArg::Auto => RouterMode::Auto,
                SbusModeArg::Manual => RouterMode::Manual,
            };
            console.set_sbus_mode(mode).await?;
            output::notice(&format!("SBUS router mode set to {mode}"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(configured: bool, has_data: bool, valid: bool, has_failsafe: bool) -> SbusSourceInfo {
        SbusSourceInfo {
            id: 0,
            name: "Device 1".into(),
            configured,
            quality: 100,
            priority: 0,
            has_data,
            valid,
            has_failsafe,
        }
    }

    #[test]
    fn signal_reflects_worst_condition() {
        assert_eq!(signal(&source(false, true, true, false)), "not configured");
        assert_eq!(signal(&source(true, false, false, false)), "no data");
        assert_eq!(signal(&source(true, true, true, true)), "failsafe");
        assert_eq!(signal(&source(true, true, true, false)), "ok");
    }
}
