//! Statistics command handlers.

use serde::Serialize;
use tabled::Tabled;

use bridgectl_core::{Console, SlotTraffic};

use crate::cli::{GlobalOpts, OutputFormat, StatsArgs, StatsCommand};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SlotStats {
    slot: u8,
    role: String,
    #[serde(flatten)]
    traffic: SlotTraffic,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Slot")]
    slot: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "RX bytes")]
    rx: u64,
    #[tabled(rename = "TX bytes")]
    tx: u64,
}

pub async fn handle(console: &Console, args: StatsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        StatsCommand::Show => {
            let status = console.status().await?;
            let stats: Vec<SlotStats> = (1u8..)
                .zip(status.role_names.iter().zip(status.traffic))
                .map(|(slot, (role, traffic))| SlotStats {
                    slot,
                    role: role.clone(),
                    traffic,
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &stats,
                |s| StatsRow {
                    slot: format!("D{}", s.slot),
                    role: if s.role.is_empty() { "-".into() } else { s.role.clone() },
                    rx: s.traffic.rx,
                    tx: s.traffic.tx,
                },
                |s| format!("D{}\t{}\t{}", s.slot, s.traffic.rx, s.traffic.tx),
            )?;
            output::print_output(&out, global.quiet);
            if matches!(global.output, OutputFormat::Table) {
                output::notice(
                    &format!("Total: {} bytes", status.total_traffic),
                    global.quiet,
                );
            }
            Ok(())
        }

        StatsCommand::Reset => {
            let message = console.reset_stats().await?;
            output::notice(&message, global.quiet);
            Ok(())
        }
    }
}
