//! Roles command handler.

use std::fmt::Write as _;

use serde::Serialize;
use tabled::Tabled;

use bridgectl_core::{Console, RoleOption, RoleSummary, Slot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Painter};

const SLOTS: [Slot; 5] = [Slot::D1, Slot::D2, Slot::D3, Slot::D4, Slot::D5];

#[derive(Serialize)]
struct SlotView {
    slot: Slot,
    current: String,
    options: Vec<RoleOption>,
}

#[derive(Serialize)]
struct RolesView {
    slots: Vec<SlotView>,
    summary: RoleSummary,
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Options")]
    options: String,
}

fn label_of(view: &SlotView) -> String {
    view.options
        .iter()
        .find(|o| o.value == view.current)
        .map_or_else(|| view.current.clone(), |o| format!("{} ({})", o.label, o.value))
}

fn detail(view: &RolesView, paint: Painter) -> String {
    let rows: Vec<SlotRow> = view
        .slots
        .iter()
        .map(|s| SlotRow {
            slot: s.slot.to_string(),
            current: label_of(s),
            options: s
                .options
                .iter()
                .map(|o| {
                    let text = format!("{}={}", o.value, o.label);
                    if o.disabled { paint.dim(&format!("({text})")) } else { text }
                })
                .collect::<Vec<_>>()
                .join("\n"),
        })
        .collect();

    let mut out = output::render_table(&rows);
    let flag = |on: bool| if on { paint.good("yes") } else { paint.dim("no") };
    let _ = write!(
        out,
        "\nSBUS active: {}  CRSF active: {}  SBUS input: {}  SBUS output: {}",
        flag(view.summary.sbus_active),
        flag(view.summary.crsf_active),
        flag(view.summary.has_sbus_input),
        flag(view.summary.has_sbus_output),
    );
    if view.summary.sbus_warning {
        let _ = write!(
            out,
            "\n{}",
            paint.warn("SBUS output is configured without an SBUS input")
        );
    }
    out
}

pub async fn handle(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    console.connect().await?;
    let state = console.state().await;

    let slots = SLOTS
        .into_iter()
        .filter(|slot| *slot != Slot::D5 || state.board().has_device5())
        .map(|slot| SlotView {
            slot,
            current: state.current().role(slot).to_owned(),
            options: state.options(slot),
        })
        .collect();
    let view = RolesView {
        slots,
        summary: state.role_summary(),
    };

    let paint = Painter::new(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| detail(v, paint),
        |v| {
            v.slots
                .iter()
                .map(|s| format!("{}={}", s.slot, s.current))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
