//! Crash log command handlers.

use tabled::Tabled;

use bridgectl_core::{Console, CrashRecord};

use crate::cli::{CrashArgs, CrashCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CrashRow {
    #[tabled(rename = "#")]
    number: u64,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Free heap")]
    heap: u64,
    #[tabled(rename = "Min heap")]
    min_heap: u64,
    #[tabled(rename = "Time")]
    at: String,
    #[tabled(rename = "Firmware")]
    version: String,
}

fn row(c: &CrashRecord) -> CrashRow {
    CrashRow {
        number: c.number,
        reason: c.reason.clone(),
        uptime: format!("{}s", c.uptime_secs),
        heap: c.heap,
        min_heap: c.min_heap,
        at: c
            .at
            .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        version: c.version.clone().unwrap_or_else(|| "-".into()),
    }
}

pub async fn handle(console: &Console, args: CrashArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CrashCommand::List => {
            let records = console.crash_log().await?;
            if records.is_empty() && matches!(global.output, OutputFormat::Table) {
                output::notice("No crashes recorded", global.quiet);
                return Ok(());
            }
            let out = output::render_list(&global.output, &records, row, |c| {
                format!("{}\t{}", c.number, c.reason)
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CrashCommand::Clear => {
            if !util::confirm("Erase the crash log?", global.yes)? {
                return Ok(());
            }
            console.clear_crash_log().await?;
            output::notice("Crash log cleared", global.quiet);
            Ok(())
        }
    }
}
