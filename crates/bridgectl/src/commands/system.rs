//! Device-level operations: clock sync, factory reset, waiting on a restart.

use std::time::Duration;

use chrono::DateTime;

use bridgectl_core::{Console, RebootReason};

use crate::cli::{GlobalOpts, OutputFormat, RebootOpts, TimeSyncArgs, WaitArgs};
use crate::config::parse_device_url;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

pub async fn time_sync(
    console: &Console,
    args: TimeSyncArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let at = args
        .at
        .as_deref()
        .map(|raw| util::parse_time(raw, "at"))
        .transpose()?;
    let epoch = console.sync_time(at).await?;
    let shown = DateTime::from_timestamp(epoch, 0)
        .map_or_else(|| epoch.to_string(), |t| t.to_rfc3339());
    output::notice(&format!("Device clock set to {shown}"), global.quiet);
    Ok(())
}

pub async fn factory_reset(
    console: &Console,
    opts: &RebootOpts,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !util::confirm(
        "Restore factory settings? WiFi credentials and roles will be erased.",
        global.yes,
    )? {
        return Ok(());
    }
    let outcome = console.factory_reset().await?;
    util::after_reboot(
        console,
        &outcome,
        RebootReason::FactoryReset,
        None,
        opts,
        global,
    )
    .await
}

/// Follow a restart that happened outside this invocation.
pub async fn wait(console: &Console, args: WaitArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let alternate = args.alternate.as_deref().map(parse_device_url).transpose()?;
    let mut timing = console.config().reconnect_config(RebootReason::Save);
    if let Some(secs) = args.wait {
        timing.wait = Duration::from_secs(secs);
    }

    let url = util::wait_for_device(console.reconnector_with(timing, alternate), global).await?;
    let paint = Painter::new(&global.color);
    output::notice(
        &format!("{} Device is answering at {url}", paint.good("✓")),
        global.quiet,
    );
    if matches!(global.output, OutputFormat::Plain) {
        output::print_output(url.as_str(), global.quiet);
    }
    Ok(())
}
